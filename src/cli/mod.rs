// src/cli/mod.rs

//! Command-line surface.

use crate::constants::{DEFAULT_CONFIG_ENV, DEFAULT_DEPLOY_COMMAND, DEFAULT_THEMEKIT_COMMAND};
use clap::Parser;
use clap::builder::FalseyValueParser;
use std::path::PathBuf;

pub mod handlers;

/// themeship: branch-aware theme deployment.
///
/// Inspects the checked-out git branch and the store's theme library, then either reuses a
/// staging theme, duplicates a base theme, backs up the live theme or deploys to it.
///
/// Decision table:
///   develop, feature/*, hotfix/*, bugfix/*  reuse the staging theme tagged with one of the
///                                           branch's commits, or duplicate a base theme
///   master + --stage backup                 duplicate the published theme
///   master + --stage deploy                 deploy to the published theme
#[derive(Parser, Debug)]
#[command(author, version, verbatim_doc_comment)]
pub struct Cli {
    /// Section of config.yml to read credentials from.
    #[arg(long = "env", env = "CONFIG_ENV", default_value = DEFAULT_CONFIG_ENV)]
    pub config_env: String,

    /// What to do on master: `backup` or `deploy`.
    #[arg(long, env = "STAGE", default_value = "backup")]
    pub stage: String,

    /// Plan and deploy, but never download, create or delete anything.
    #[arg(long, env = "IS_QUICK_TEST", value_parser = FalseyValueParser::new())]
    pub quick_test: bool,

    /// Use this theme id as the base instead of applying the selection rules.
    #[arg(long, env = "BASE_THEME")]
    pub base_theme: Option<u64>,

    /// Stop after printing the plan. No workspace, no Theme Kit, no deploy.
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the credentials file. Defaults to `<project-root>/config.yml`.
    #[arg(long, env = "THEMESHIP_CONFIG")]
    pub config: Option<String>,

    /// The theme project (and git repository). Defaults to the current directory.
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Command line used to invoke Theme Kit.
    #[arg(long = "themekit", env = "THEMEKIT_COMMAND", default_value = DEFAULT_THEMEKIT_COMMAND)]
    pub themekit_command: String,

    /// Command line of the build-and-deploy step.
    #[arg(long, env = "DEPLOY_COMMAND", default_value = DEFAULT_DEPLOY_COMMAND)]
    pub deploy_command: String,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["themeship"]).unwrap();
        assert_eq!(cli.stage, "backup");
        assert_eq!(cli.themekit_command, "theme");
        assert_eq!(cli.verbose, 0);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "themeship",
            "--env",
            "staging",
            "--stage",
            "deploy",
            "--quick-test",
            "--base-theme",
            "123",
            "--dry-run",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.config_env, "staging");
        assert_eq!(cli.stage, "deploy");
        assert!(cli.quick_test);
        assert_eq!(cli.base_theme, Some(123));
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_non_numeric_base_theme() {
        assert!(Cli::try_parse_from(["themeship", "--base-theme", "live"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
