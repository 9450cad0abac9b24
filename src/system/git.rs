// src/system/git.rs

//! Read-only git queries: the checked-out branch and the commits unique to it.

use crate::{
    core::classify::BranchKind,
    models::BranchSnapshot,
    system::executor::{self, ExecutionError, ExternalCommand},
};
use std::path::{Path, PathBuf};

/// Runs git inside one repository.
#[derive(Debug, Clone)]
pub struct GitInspector {
    repo: PathBuf,
}

impl GitInspector {
    /// An inspector for the repository at `repo`.
    pub fn new(repo: &Path) -> Self {
        Self {
            repo: repo.to_path_buf(),
        }
    }

    fn git(&self) -> ExternalCommand {
        ExternalCommand::new("git", &self.repo)
    }

    /// Returns the name of the checked-out branch.
    pub async fn current_branch(&self) -> Result<String, ExecutionError> {
        let output = executor::execute_and_capture_output(&self.git().arg("branch")).await?;
        parse_current_branch(&output).ok_or_else(|| ExecutionError::CommandParse(
            "`git branch` did not report a checked-out branch".to_string(),
        ))
    }

    /// Fetches every remote, then lists the commits on HEAD that `base` does not have.
    pub async fn unmerged_commits(&self, base: &str) -> Result<Vec<String>, ExecutionError> {
        executor::execute_and_capture_output(&self.git().arg("fetch").arg("--all")).await?;
        let output =
            executor::execute_and_capture_output(&self.git().arg("cherry").arg("-v").arg(base))
                .await?;
        Ok(parse_cherry_output(&output))
    }

    /// Collects everything the planner needs to know about the branch.
    pub async fn inspect(&self) -> Result<BranchSnapshot, ExecutionError> {
        let name = self.current_branch().await?;
        let kind = BranchKind::classify(&name);
        let base = kind.base_branch().to_string();
        log::info!("On branch '{}' ({}); comparing against '{}'.", name, kind, base);

        let commits = self.unmerged_commits(&base).await?;
        log::debug!("{} commit(s) not in '{}'.", commits.len(), base);

        Ok(BranchSnapshot {
            name,
            kind,
            base,
            commits,
        })
    }
}

/// Extracts the branch marked with `*` from `git branch` output.
pub fn parse_current_branch(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim_start().strip_prefix('*'))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Turns `git cherry -v` output into commit entries, dropping the `+`/`-` markers.
pub fn parse_cherry_output(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim().trim_start_matches(['+', '-']).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
