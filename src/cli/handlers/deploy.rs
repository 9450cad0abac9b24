// src/cli/handlers/deploy.rs

//! The `themeship` run: resolve options, gather inputs, plan, execute, clean up.

use crate::{
    cli::Cli,
    constants::CONFIG_FILENAME,
    core::{
        config_loader,
        planner::{self, Plan},
        workflow::{self, Outcome, ThemeTooling},
    },
    models::{BranchSnapshot, RunOptions, Stage, Theme},
    system::{git::GitInspector, themekit::ThemeKit, themes_api::ThemesClient, workspace::Workspace},
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolves flags, environment and `config.yml` into the options of one run.
///
/// # Arguments
/// * `cli` - Parsed command-line arguments (environment fallbacks already applied by clap).
/// * `env` - A snapshot of the process environment, for the credential fallback.
/// * `cwd` - The directory the tool was started from.
pub fn resolve_options(cli: &Cli, env: &HashMap<String, String>, cwd: &Path) -> Result<RunOptions> {
    let project_root = match &cli.project_root {
        Some(root) if root.is_absolute() => root.clone(),
        Some(root) => cwd.join(root),
        None => cwd.to_path_buf(),
    };

    let config_path = match &cli.config {
        Some(template) => {
            let expanded = shellexpand::tilde(template);
            let path = PathBuf::from(expanded.as_ref());
            if path.is_absolute() { path } else { project_root.join(path) }
        }
        None => project_root.join(CONFIG_FILENAME),
    };

    let credentials = config_loader::load_credentials(&config_path, &cli.config_env, env)
        .context("Failed to load store credentials")?;

    Ok(RunOptions {
        config_env: cli.config_env.clone(),
        stage: Stage::parse(&cli.stage),
        quick_test: cli.quick_test,
        dry_run: cli.dry_run,
        base_theme: cli.base_theme,
        project_root,
        credentials,
        themekit_command: cli.themekit_command.clone(),
        deploy_command: cli.deploy_command.clone(),
    })
}

/// Main entry point: inspect, list and prepare concurrently, plan, execute, clean up.
pub async fn handle(cli: Cli) -> Result<Outcome> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let cwd = std::env::current_dir().context("Could not determine the current directory")?;
    let options = resolve_options(&cli, &env, &cwd)?;
    log::debug!("Run options: {:?}", options);

    print_header(&options);

    let workspace = Workspace::new(&options.project_root, options.quick_test);
    let git = GitInspector::new(&options.project_root);
    let api = ThemesClient::new(&options.credentials)?;

    // --- Fan-out: the three inputs are independent. The first failure aborts the run. ---
    let prepare = prepare_workspace(&workspace, options.dry_run);
    let inspect = async {
        git.inspect()
            .await
            .context("Failed to inspect the git branch")
    };
    let list = async {
        api.list_themes()
            .await
            .context("Failed to list the store's themes")
    };
    let ((), branch, themes) = tokio::try_join!(prepare, inspect, list)?;
    print_branch(&branch);

    let tooling = ThemeKit::new(&options);
    plan_and_run(&branch, &themes, &options, Utc::now(), &tooling, &workspace).await
}

/// Creates the scratch directory. A dry run never touches it.
async fn prepare_workspace(workspace: &Workspace, dry_run: bool) -> Result<()> {
    if dry_run {
        return Ok(());
    }
    workspace
        .prepare()
        .await
        .map(|_| ())
        .context("Failed to prepare the workspace")
}

/// Plans from the gathered inputs, carries the plan out and removes the workspace.
///
/// A planning error returns before cleanup, so the workspace is left in place. Once a plan
/// has run, cleanup happens whatever the result, and a cleanup failure is only logged.
pub async fn plan_and_run<T: ThemeTooling>(
    branch: &BranchSnapshot,
    themes: &[Theme],
    options: &RunOptions,
    now: DateTime<Utc>,
    tooling: &T,
    workspace: &Workspace,
) -> Result<Outcome> {
    let plan = planner::plan(branch, &options.stage, options.base_theme, themes, now)?;
    println!("{} {}", "Plan:".bold(), plan.to_string().cyan());

    if options.dry_run {
        return Ok(Outcome::Idle {
            reason: "dry run".to_string(),
        });
    }
    if let Plan::Idle { reason } = &plan {
        workspace.cleanup().await?;
        return Ok(Outcome::Idle {
            reason: reason.clone(),
        });
    }

    // --- Execute, then always clean up ---
    let result = workflow::execute_plan(&plan, tooling, workspace, options.quick_test).await;

    if let Err(e) = workspace.cleanup().await {
        log::warn!("Could not clean up the workspace: {}", e);
    }

    result.with_context(|| format!("Failed to {}", plan))
}

fn print_header(options: &RunOptions) {
    println!("{}", "themeship".bold());
    println!("  Store: {}", options.credentials.store.cyan());
    println!("  Config: {} / stage {}", options.config_env, options.stage);
    if options.quick_test {
        println!("  {}", "Quick-test mode: nothing will be downloaded, created or deleted.".yellow());
    }
    if options.dry_run {
        println!("  {}", "Dry run: stopping after the plan.".yellow());
    }
}

fn print_branch(branch: &BranchSnapshot) {
    println!(
        "  Branch: {} ({}), {} commit(s) not in {}",
        branch.name.cyan(),
        branch.kind,
        branch.commits.len(),
        branch.base
    );
}

/// Prints the final summary of a run.
pub fn report_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Deployed {
            theme_id,
            duplicated_from: Some(base),
        } => println!(
            "{} Deployed to new theme #{} (duplicated from #{}).",
            "✓".green(),
            theme_id,
            base
        ),
        Outcome::Deployed {
            theme_id,
            duplicated_from: None,
        } => println!("{} Deployed to theme #{}.", "✓".green(), theme_id),
        Outcome::BackedUp { theme_id, source } => println!(
            "{} Backed up theme #{} as theme #{}.",
            "✓".green(),
            source,
            theme_id
        ),
        Outcome::Idle { reason } => println!("{} Nothing to do: {}.", "•".yellow(), reason),
    }
}
