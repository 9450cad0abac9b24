// src/system/themekit.rs

//! The external tools that move theme files: Theme Kit for download/create and the
//! project's own build-and-deploy command.

use crate::{
    core::workflow::ThemeTooling,
    models::{Credentials, RunOptions},
    system::executor::{self, ExecutionError, ExternalCommand},
};
use colored::*;
use std::path::{Path, PathBuf};

/// Shells out to Theme Kit and to the deploy command with explicit credentials.
#[derive(Debug, Clone)]
pub struct ThemeKit {
    themekit_command: String,
    deploy_command: String,
    credentials: Credentials,
    project_root: PathBuf,
}

impl ThemeKit {
    /// Takes the tool command lines, credentials and project root from the run options.
    pub fn new(options: &RunOptions) -> Self {
        Self {
            themekit_command: options.themekit_command.clone(),
            deploy_command: options.deploy_command.clone(),
            credentials: options.credentials.clone(),
            project_root: options.project_root.clone(),
        }
    }

    /// `theme <subcommand> --password P --store S` running in `dir`.
    fn themekit(&self, subcommand: &str, dir: &Path) -> Result<ExternalCommand, ExecutionError> {
        Ok(ExternalCommand::from_command_line(&self.themekit_command, dir)?
            .arg(subcommand)
            .arg("--password")
            .secret_arg(&self.credentials.password)
            .arg("--store")
            .arg(&self.credentials.store))
    }

    pub(crate) fn download_command(&self, theme_id: u64, dir: &Path) -> Result<ExternalCommand, ExecutionError> {
        Ok(self
            .themekit("download", dir)?
            .arg("--themeid")
            .arg(theme_id.to_string())
            .arg("--dir")
            .arg(dir.to_string_lossy()))
    }

    pub(crate) fn create_command(&self, name: &str, dir: &Path) -> Result<ExternalCommand, ExecutionError> {
        Ok(self
            .themekit("new", dir)?
            .arg("--name")
            .arg(name)
            .arg("--dir")
            .arg(dir.to_string_lossy()))
    }

    /// The deploy command runs from the project root and is told not to look for its own config.
    pub(crate) fn deploy_command(&self, theme_id: u64) -> Result<ExternalCommand, ExecutionError> {
        Ok(
            ExternalCommand::from_command_line(&self.deploy_command, &self.project_root)?
                .arg("--password")
                .secret_arg(&self.credentials.password)
                .arg("--store")
                .arg(&self.credentials.store)
                .arg("--themeid")
                .arg(theme_id.to_string())
                .arg("--no-config"),
        )
    }

    async fn run(command: ExternalCommand) -> Result<(), ExecutionError> {
        println!("{} {}", "→".blue(), command.display().green());
        executor::execute_command(&command).await
    }
}

impl ThemeTooling for ThemeKit {
    async fn download_theme(&self, theme_id: u64, dir: &Path) -> Result<(), ExecutionError> {
        Self::run(self.download_command(theme_id, dir)?).await
    }

    async fn create_theme(&self, name: &str, dir: &Path) -> Result<(), ExecutionError> {
        Self::run(self.create_command(name, dir)?).await
    }

    async fn deploy(&self, theme_id: u64) -> Result<(), ExecutionError> {
        Self::run(self.deploy_command(theme_id)?).await
    }
}
