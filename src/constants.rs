// src/constants.rs

//! Fixed names and defaults shared across the crate.

/// The name of the scratch directory created under the project root for each run.
pub const SCRATCH_DIR_NAME: &str = "tmp";

/// The name of the credentials file at the project root, and of the file Theme Kit
/// writes into the scratch directory after creating a theme.
pub const CONFIG_FILENAME: &str = "config.yml";

/// The environment section Theme Kit writes the new theme id under.
pub const CREATED_THEME_ENV: &str = "development";

/// Placeholder name given to a freshly duplicated theme until the deploy renames it.
pub const PENDING_THEME_NAME: &str = "[DEPLOYING] - in progress";

/// Staging themes older than this are not reused on the `develop` branch.
pub const STAGING_MAX_AGE_DAYS: i64 = 7;

/// The default config environment when `CONFIG_ENV` is not set.
pub const DEFAULT_CONFIG_ENV: &str = "production";

/// The default content-sync tool (Theme Kit).
pub const DEFAULT_THEMEKIT_COMMAND: &str = "theme";

/// The default build-and-deploy command, run from the project root.
pub const DEFAULT_DEPLOY_COMMAND: &str = "npx slate-tools deploy";

/// Environment variables used when no `config.yml` exists.
pub const ENV_API_KEY: &str = "SHOPIFY_API_KEY";
/// See [`ENV_API_KEY`].
pub const ENV_PASSWORD: &str = "SHOPIFY_PASSWORD";
/// See [`ENV_API_KEY`].
pub const ENV_STORE: &str = "SHOPIFY_STORE";

/// Text substituted for secret arguments in logged command lines.
pub const REDACTED: &str = "*****";
