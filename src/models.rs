// src/models.rs

//! Data types shared by the planner, the system adapters and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::core::classify::BranchKind;

// --- REMOTE THEMES (what `themes.json` returns) ---

/// The role the platform assigns to a theme. Exactly one theme is `main` (published).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeRole {
    /// The published theme.
    Main,
    /// An ordinary theme in the library.
    Unpublished,
    /// A trial theme from the theme store.
    Demo,
    /// A development theme bound to a CLI session.
    Development,
    /// Any role this tool does not know about.
    #[serde(other)]
    Other,
}

/// A remote theme snapshot. This tool only reads and creates themes, never edits one in place.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Numeric theme id assigned by the platform.
    pub id: u64,
    /// Display name, usually `"<ENV> - <label>(<commit>)"`.
    pub name: String,
    /// Publication role.
    pub role: ThemeRole,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Theme {
    /// Returns true if this is the published theme.
    pub fn is_published(&self) -> bool {
        self.role == ThemeRole::Main
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (#{})", self.name, self.id)
    }
}

/// The envelope around the theme list in `GET /admin/themes.json`.
#[derive(Deserialize, Debug)]
pub struct ThemesResponse {
    /// Every theme in the store, in API order.
    pub themes: Vec<Theme>,
}

// --- SOURCE CONTROL ---

/// Everything the planner needs to know about the checked-out branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSnapshot {
    /// The checked-out branch, as `git branch` prints it.
    pub name: String,
    /// The classified branch name.
    pub kind: BranchKind,
    /// The branch the commit list was computed against.
    pub base: String,
    /// `git cherry -v` entries (`<sha> <subject>`) unique to this branch.
    pub commits: Vec<String>,
}

// --- CONFIGURATION ---

/// Store credentials, read from one section of `config.yml` or from the environment.
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Private app API key.
    pub api_key: String,
    /// Private app password; also used by Theme Kit.
    pub password: String,
    /// Store domain, e.g. `my-shop.myshopify.com`.
    pub store: String,
}

// Secrets stay out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &crate::constants::REDACTED)
            .field("password", &crate::constants::REDACTED)
            .field("store", &self.store)
            .finish()
    }
}

/// The deployment stage requested for the `master` branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Duplicate the published theme as a backup.
    Backup,
    /// Deploy straight onto the published theme.
    Deploy,
    /// Anything else. The master branch takes no action.
    Other(String),
}

impl Stage {
    /// Parses a stage name case-insensitively. Unknown names are kept, not rejected.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "backup" => Stage::Backup,
            "deploy" => Stage::Deploy,
            _ => Stage::Other(value.trim().to_string()),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Backup => f.write_str("backup"),
            Stage::Deploy => f.write_str("deploy"),
            Stage::Other(s) => f.write_str(s),
        }
    }
}

/// The immutable settings of one run, resolved from flags, environment and `config.yml`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Section of `config.yml` the credentials came from.
    pub config_env: String,
    /// What to do on `master`.
    pub stage: Stage,
    /// Skips every call that creates or deletes a real resource.
    pub quick_test: bool,
    /// Stops after planning.
    pub dry_run: bool,
    /// Explicit base theme, overriding the selection rules.
    pub base_theme: Option<u64>,
    /// The theme project and git repository.
    pub project_root: PathBuf,
    /// Store credentials for the API, Theme Kit and the deploy command.
    pub credentials: Credentials,
    /// Command line of the content-sync tool, e.g. `theme`.
    pub themekit_command: String,
    /// Command line of the build-and-deploy step.
    pub deploy_command: String,
}
