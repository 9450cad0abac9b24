// src/system/workspace.rs

//! The scratch directory a run downloads theme files into.

use crate::constants::{CONFIG_FILENAME, CREATED_THEME_ENV, SCRATCH_DIR_NAME};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while managing the scratch directory.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Could not {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
    #[error("'{path}' has no '{env}.theme_id' entry.")]
    MissingThemeId { path: PathBuf, env: &'static str },
    #[error("'{path}' has an invalid theme id '{value}'.")]
    InvalidThemeId { path: PathBuf, value: String },
}

/// The shape Theme Kit writes into `config.yml`; only the theme id matters here.
#[derive(Deserialize, Debug)]
struct ThemeKitEnvironment {
    theme_id: Option<ThemeIdValue>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ThemeIdValue {
    Number(u64),
    Text(String),
}

/// A scratch directory under the project root, recreated for every run.
///
/// In quick-test mode the directory is reused: nothing is ever deleted.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    quick_test: bool,
}

impl Workspace {
    /// A workspace at `<project_root>/tmp`.
    pub fn new(project_root: &Path, quick_test: bool) -> Self {
        Self {
            root: project_root.join(SCRATCH_DIR_NAME),
            quick_test,
        }
    }

    /// The scratch directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Empties (unless quick-test) and creates the scratch directory.
    pub async fn prepare(&self) -> Result<PathBuf, WorkspaceError> {
        if !self.quick_test {
            remove_if_exists(&self.root).await?;
        }
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| WorkspaceError::Io {
                action: "create",
                path: self.root.clone(),
                source,
            })?;
        log::debug!("Workspace ready at {}", self.root.display());
        Ok(self.root.clone())
    }

    /// Removes the scratch directory, unless in quick-test mode.
    pub async fn cleanup(&self) -> Result<(), WorkspaceError> {
        if self.quick_test {
            log::debug!("Quick-test mode: keeping {}", self.root.display());
            return Ok(());
        }
        remove_if_exists(&self.root).await?;
        log::debug!("Workspace {} removed.", self.root.display());
        Ok(())
    }

    /// Reads the id of the theme Theme Kit just created from `<workspace>/config.yml`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub async fn read_created_theme_id(&self) -> Result<Option<u64>, WorkspaceError> {
        let path = self.root.join(CONFIG_FILENAME);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(WorkspaceError::Io {
                    action: "read",
                    path,
                    source,
                });
            }
        };
        parse_created_theme_id(&content, &path).map(Some)
    }
}

async fn remove_if_exists(path: &Path) -> Result<(), WorkspaceError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(WorkspaceError::Io {
            action: "remove",
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_created_theme_id(content: &str, path: &Path) -> Result<u64, WorkspaceError> {
    let environments: HashMap<String, ThemeKitEnvironment> = serde_yaml_ng::from_str(content)
        .map_err(|source| WorkspaceError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

    let missing = || WorkspaceError::MissingThemeId {
        path: path.to_path_buf(),
        env: CREATED_THEME_ENV,
    };
    let value = environments
        .get(CREATED_THEME_ENV)
        .and_then(|env| env.theme_id.as_ref())
        .ok_or_else(missing)?;

    match value {
        ThemeIdValue::Number(id) => Ok(*id),
        ThemeIdValue::Text(text) => text.trim().parse().map_err(|_| WorkspaceError::InvalidThemeId {
            path: path.to_path_buf(),
            value: text.clone(),
        }),
    }
}
