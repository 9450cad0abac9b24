// src/core/config_loader.rs

//! # Config Loader
//!
//! Resolves store credentials for a run. `config.yml` at the project root is keyed by
//! environment name:
//!
//! ```yaml
//! production:
//!   api_key: 0123abcd
//!   password: shppa_...
//!   store: my-shop.myshopify.com
//! ```
//!
//! When the file does not exist, `SHOPIFY_API_KEY`, `SHOPIFY_PASSWORD` and `SHOPIFY_STORE`
//! are read instead. An existing but broken file is an error, never a silent fallback.

use crate::{
    constants::{ENV_API_KEY, ENV_PASSWORD, ENV_STORE},
    models::Credentials,
};
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while resolving credentials.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
    #[error("'{path}' has no '{env}' section. Available: {available}")]
    MissingEnvironment {
        path: PathBuf,
        env: String,
        available: String,
    },
    #[error("'{field}' is empty in the '{env}' section of '{path}'.")]
    EmptyField {
        path: PathBuf,
        env: String,
        field: &'static str,
    },
    #[error("No config file at '{path}' and the environment variable {var} is not set.")]
    MissingVariable { path: PathBuf, var: &'static str },
}

/// Loads the credentials of `env_name` from `config_path`, falling back to the environment.
///
/// # Arguments
/// * `config_path` - Path to `config.yml`. It does not have to exist.
/// * `env_name` - The section to read, e.g. `production`.
/// * `env` - A snapshot of the process environment.
pub fn load_credentials(
    config_path: &Path,
    env_name: &str,
    env: &HashMap<String, String>,
) -> Result<Credentials, ConfigError> {
    match std::fs::read_to_string(config_path) {
        Ok(content) => {
            log::debug!(
                "Reading '{}' credentials from {}",
                env_name,
                config_path.display()
            );
            credentials_from_yaml(&content, config_path, env_name)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!(
                "{} not found; reading credentials from the environment.",
                config_path.display()
            );
            credentials_from_env(config_path, env)
        }
        Err(source) => Err(ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        }),
    }
}

fn credentials_from_yaml(
    content: &str,
    path: &Path,
    env_name: &str,
) -> Result<Credentials, ConfigError> {
    // BTreeMap keeps the "available" list in the error message stable.
    let mut sections: BTreeMap<String, Credentials> =
        serde_yaml_ng::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let available = sections.keys().cloned().collect::<Vec<_>>().join(", ");
    let credentials = sections
        .remove(env_name)
        .ok_or_else(|| ConfigError::MissingEnvironment {
            path: path.to_path_buf(),
            env: env_name.to_string(),
            available,
        })?;

    let fields = [
        ("api_key", &credentials.api_key),
        ("password", &credentials.password),
        ("store", &credentials.store),
    ];
    if let Some((field, _)) = fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .copied()
    {
        return Err(ConfigError::EmptyField {
            path: path.to_path_buf(),
            env: env_name.to_string(),
            field,
        });
    }
    Ok(credentials)
}

fn credentials_from_env(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<Credentials, ConfigError> {
    let var = |name: &'static str| {
        env.get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::MissingVariable {
                path: path.to_path_buf(),
                var: name,
            })
    };
    Ok(Credentials {
        api_key: var(ENV_API_KEY)?,
        password: var(ENV_PASSWORD)?,
        store: var(ENV_STORE)?,
    })
}
