// src/system/themes_api.rs

//! Read access to the store's theme library over the Admin REST API.

use crate::models::{Credentials, Theme, ThemesResponse};
use thiserror::Error;

/// Failures while listing themes.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid store address '{0}'.")]
    InvalidStore(String),
    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{url}' answered with HTTP {status}.")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Could not parse the theme list from '{url}': {source}")]
    Parse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A client for `GET /admin/themes.json`, authenticated with HTTP Basic auth.
#[derive(Debug, Clone)]
pub struct ThemesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    password: String,
}

impl ThemesClient {
    /// Creates a client for `https://<store>`.
    pub fn new(credentials: &Credentials) -> Result<Self, ApiError> {
        let store = credentials
            .store
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        if store.is_empty() || store.contains(char::is_whitespace) {
            return Err(ApiError::InvalidStore(credentials.store.clone()));
        }
        Ok(Self::with_base_url(format!("https://{}", store), credentials))
    }

    /// Creates a client against an arbitrary base URL, e.g. a local mock server.
    pub fn with_base_url(base_url: impl Into<String>, credentials: &Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            password: credentials.password.clone(),
        }
    }

    fn themes_url(&self) -> String {
        format!("{}/admin/themes.json", self.base_url)
    }

    /// Fetches every theme in the store, most recently updated first.
    pub async fn list_themes(&self) -> Result<Vec<Theme>, ApiError> {
        let url = self.themes_url();
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.api_key, Some(&self.password))
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }

        let payload: ThemesResponse = response
            .json()
            .await
            .map_err(|source| ApiError::Parse {
                url: url.clone(),
                source,
            })?;

        let mut themes = payload.themes;
        sort_most_recent_first(&mut themes);
        log::info!("Found {} theme(s) in the store.", themes.len());
        Ok(themes)
    }
}

/// Sorts themes by `updated_at`, newest first. Ties keep their original order.
pub fn sort_most_recent_first(themes: &mut [Theme]) {
    themes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
