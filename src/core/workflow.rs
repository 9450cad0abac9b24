// src/core/workflow.rs

//! Carrying out a plan through the external theme tooling.

use crate::{
    constants::PENDING_THEME_NAME,
    core::planner::Plan,
    models::Theme,
    system::{
        executor::ExecutionError,
        workspace::{Workspace, WorkspaceError},
    },
};
use std::future::Future;
use std::path::Path;
use thiserror::Error;

/// Failures while carrying out a plan.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Failed to download theme #{theme_id} into the workspace.")]
    DownloadFailed { theme_id: u64 },
    #[error("Theme Kit did not record the id of the theme it created.")]
    CreatedThemeUnknown,
    #[error(transparent)]
    Tooling(#[from] ExecutionError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// The external side effects a plan can trigger.
///
/// `ThemeKit` is the real implementation; tests substitute a recorder.
pub trait ThemeTooling {
    /// Downloads every file of `theme_id` into `dir`.
    fn download_theme(
        &self,
        theme_id: u64,
        dir: &Path,
    ) -> impl Future<Output = Result<(), ExecutionError>> + Send;

    /// Creates a new theme named `name` from the files in `dir`.
    /// The new theme's id is written to `dir/config.yml`.
    fn create_theme(
        &self,
        name: &str,
        dir: &Path,
    ) -> impl Future<Output = Result<(), ExecutionError>> + Send;

    /// Builds the project and uploads it to `theme_id`.
    fn deploy(&self, theme_id: u64) -> impl Future<Output = Result<(), ExecutionError>> + Send;
}

/// What a run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Deployed to `theme_id`. `duplicated_from` is set when the theme was created by this run.
    Deployed {
        theme_id: u64,
        duplicated_from: Option<u64>,
    },
    /// Duplicated `source` into `theme_id` without deploying.
    BackedUp { theme_id: u64, source: u64 },
    /// Nothing was done.
    Idle { reason: String },
}

/// Copies `base` into a brand-new theme and returns the new theme's id.
///
/// In quick-test mode the download and create steps are skipped and the id is read from
/// whatever `config.yml` an earlier run left in the workspace. Without one there is no
/// theme to deploy to and the run fails; the base theme is never used as the target.
pub async fn duplicate_theme<T: ThemeTooling>(
    tooling: &T,
    workspace: &Workspace,
    base: &Theme,
    quick_test: bool,
) -> Result<u64, WorkflowError> {
    log::info!("Duplicating base theme {}.", base);

    if quick_test {
        log::info!("Quick-test mode: skipping download and theme creation.");
    } else {
        tooling
            .download_theme(base.id, workspace.path())
            .await
            .map_err(|e| {
                log::debug!("Download of theme #{} failed: {}", base.id, e);
                WorkflowError::DownloadFailed { theme_id: base.id }
            })?;
        tooling.create_theme(PENDING_THEME_NAME, workspace.path()).await?;
    }

    match workspace.read_created_theme_id().await? {
        Some(id) => {
            log::info!("Created theme #{} from {}.", id, base);
            Ok(id)
        }
        None => {
            if quick_test {
                log::warn!(
                    "Quick-test mode: no config.yml left in {}.",
                    workspace.path().display()
                );
            }
            Err(WorkflowError::CreatedThemeUnknown)
        }
    }
}

/// Carries out a plan. Steps run strictly one after another.
pub async fn execute_plan<T: ThemeTooling>(
    plan: &Plan,
    tooling: &T,
    workspace: &Workspace,
    quick_test: bool,
) -> Result<Outcome, WorkflowError> {
    match plan {
        Plan::DeployExisting { theme } => {
            log::info!("Reusing staging theme {}.", theme);
            tooling.deploy(theme.id).await?;
            Ok(Outcome::Deployed {
                theme_id: theme.id,
                duplicated_from: None,
            })
        }
        Plan::DuplicateAndDeploy { base } => {
            let theme_id = duplicate_theme(tooling, workspace, base, quick_test).await?;
            tooling.deploy(theme_id).await?;
            Ok(Outcome::Deployed {
                theme_id,
                duplicated_from: Some(base.id),
            })
        }
        Plan::Backup { base } => {
            let theme_id = duplicate_theme(tooling, workspace, base, quick_test).await?;
            Ok(Outcome::BackedUp {
                theme_id,
                source: base.id,
            })
        }
        Plan::DeployBase { base } => {
            tooling.deploy(base.id).await?;
            Ok(Outcome::Deployed {
                theme_id: base.id,
                duplicated_from: None,
            })
        }
        Plan::Idle { reason } => Ok(Outcome::Idle {
            reason: reason.clone(),
        }),
    }
}
