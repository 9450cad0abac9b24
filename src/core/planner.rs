// src/core/planner.rs

//! # Deployment Planner
//!
//! Pure decision logic. Given the branch snapshot, the run options and the remote theme list
//! (most recently updated first), `plan` decides which theme to deploy to and whether a
//! duplicate has to be made first. Nothing here performs I/O, so every row of the decision
//! table is covered by the unit tests below.

use crate::{
    constants::STAGING_MAX_AGE_DAYS,
    core::classify::{BranchKind, EnvironmentTag, ThemeName},
    models::{BranchSnapshot, Stage, Theme},
};
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use thiserror::Error;

/// Store states in which no plan can be made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// `--base-theme` names a theme the store does not have.
    #[error("Base theme #{0} was requested but does not exist in the store.")]
    BaseThemeNotFound(u64),
    /// No theme has role `main`.
    #[error("The store has no published (role 'main') theme.")]
    NoPublishedTheme,
    /// Neither the published theme nor any other is tagged LIVE or STAGE.
    #[error(
        "No deployable base theme: the published theme is not LIVE or STAGE and no other LIVE or STAGE theme exists."
    )]
    NoDeployableBase,
}

/// What the run is going to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// A fresh staging theme for this branch already exists; deploy onto it.
    DeployExisting { theme: Theme },
    /// Duplicate `base` into a new theme and deploy onto the copy.
    DuplicateAndDeploy { base: Theme },
    /// Master branch, `backup` stage: duplicate `base` and stop.
    Backup { base: Theme },
    /// Master branch, `deploy` stage: deploy onto `base` directly.
    DeployBase { base: Theme },
    /// Nothing to do for this branch/stage combination.
    Idle { reason: String },
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::DeployExisting { theme } => write!(f, "deploy to existing staging theme {}", theme),
            Plan::DuplicateAndDeploy { base } => {
                write!(f, "duplicate {} into a new theme, then deploy to it", base)
            }
            Plan::Backup { base } => write!(f, "back up {} into a new theme", base),
            Plan::DeployBase { base } => write!(f, "deploy to {}", base),
            Plan::Idle { reason } => write!(f, "nothing to do ({})", reason),
        }
    }
}

/// Inputs to base selection that come from the run options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseRequest {
    /// An explicit theme id that overrides every other rule.
    pub explicit_id: Option<u64>,
    /// Always use the published theme.
    pub force_published: bool,
}

/// Builds the plan for one run.
///
/// # Arguments
/// * `branch` - The inspected branch and its unmerged commits.
/// * `stage` - The requested stage (only consulted on `master`).
/// * `explicit_base` - The `BASE_THEME` override, if any.
/// * `themes` - Remote themes, most recently updated first.
/// * `now` - The reference time for staging freshness.
pub fn plan(
    branch: &BranchSnapshot,
    stage: &Stage,
    explicit_base: Option<u64>,
    themes: &[Theme],
    now: DateTime<Utc>,
) -> Result<Plan, PlanError> {
    log::debug!(
        "Planning for branch '{}' ({}), stage '{}', {} theme(s), {} commit(s).",
        branch.name,
        branch.kind,
        stage,
        themes.len(),
        branch.commits.len()
    );

    match branch.kind {
        BranchKind::Develop | BranchKind::Feature => {
            if let Some(theme) = find_staging_match(branch.kind, &branch.commits, themes, now) {
                return Ok(Plan::DeployExisting { theme: theme.clone() });
            }
            let base = select_base(
                themes,
                BaseRequest {
                    explicit_id: explicit_base,
                    force_published: false,
                },
            )?;
            Ok(Plan::DuplicateAndDeploy { base: base.clone() })
        }
        BranchKind::Master => {
            let request = BaseRequest {
                explicit_id: explicit_base,
                force_published: true,
            };
            match stage {
                Stage::Backup => Ok(Plan::Backup {
                    base: select_base(themes, request)?.clone(),
                }),
                Stage::Deploy => Ok(Plan::DeployBase {
                    base: select_base(themes, request)?.clone(),
                }),
                Stage::Other(name) => Ok(Plan::Idle {
                    reason: format!("stage '{}' has no action on master", name),
                }),
            }
        }
        BranchKind::Other => Ok(Plan::Idle {
            reason: format!("branch '{}' is not deployed", branch.name),
        }),
    }
}

/// Finds the most recently updated staging theme whose commit token appears in `commits`.
///
/// On `develop`, matches updated more than `STAGING_MAX_AGE_DAYS` before `now` are skipped.
pub fn find_staging_match<'t>(
    kind: BranchKind,
    commits: &[String],
    themes: &'t [Theme],
    now: DateTime<Utc>,
) -> Option<&'t Theme> {
    let max_age = Duration::days(STAGING_MAX_AGE_DAYS);

    themes.iter().find(|theme| {
        let name = ThemeName::parse(&theme.name);
        if name.tag != EnvironmentTag::Stage || !name.matches_any_commit(commits) {
            return false;
        }
        if kind == BranchKind::Develop && now.signed_duration_since(theme.updated_at) > max_age {
            log::info!(
                "Staging theme {} matches but was last updated {}; treating it as stale.",
                theme,
                theme.updated_at
            );
            return false;
        }
        log::info!(
            "Staging theme {} ({}) carries commit {} from this branch.",
            theme,
            name.label,
            name.commit
        );
        true
    })
}

/// Picks the theme to duplicate from (or deploy to, on master).
pub fn select_base(themes: &[Theme], request: BaseRequest) -> Result<&Theme, PlanError> {
    if let Some(id) = request.explicit_id {
        return themes
            .iter()
            .find(|t| t.id == id)
            .ok_or(PlanError::BaseThemeNotFound(id));
    }

    let published = themes
        .iter()
        .find(|t| t.is_published())
        .ok_or(PlanError::NoPublishedTheme)?;

    if request.force_published || ThemeName::parse(&published.name).tag.is_deployable_base() {
        return Ok(published);
    }

    log::debug!(
        "Published theme {} is not LIVE or STAGE; looking for another base.",
        published
    );
    themes
        .iter()
        .find(|t| ThemeName::parse(&t.name).tag.is_deployable_base())
        .ok_or(PlanError::NoDeployableBase)
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThemeRole;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    fn theme(id: u64, name: &str, role: ThemeRole, days_old: i64) -> Theme {
        Theme {
            id,
            name: name.to_string(),
            role,
            updated_at: now() - Duration::days(days_old),
        }
    }

    fn branch(name: &str, commits: &[&str]) -> BranchSnapshot {
        let kind = BranchKind::classify(name);
        BranchSnapshot {
            name: name.to_string(),
            kind,
            base: kind.base_branch().to_string(),
            commits: commits.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn store() -> Vec<Theme> {
        vec![
            theme(30, "STAGE - other (deadbeef)", ThemeRole::Unpublished, 1),
            theme(20, "LIVE - Spring", ThemeRole::Main, 2),
            theme(10, "STAGE - older", ThemeRole::Unpublished, 9),
        ]
    }

    // --- Path A: develop / feature ---

    #[test]
    fn test_feature_without_staging_match_duplicates() {
        for name in ["feature/cart", "hotfix/tax", "bugfix/menu"] {
            let result = plan(&branch(name, &["abc123 Fix"]), &Stage::Backup, None, &store(), now());
            match result.unwrap() {
                Plan::DuplicateAndDeploy { base } => assert_eq!(base.id, 20),
                other => panic!("Expected DuplicateAndDeploy for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_feature_reuses_matching_staging_theme() {
        let mut themes = store();
        themes.insert(0, theme(40, "STAGE - cart (abc123)", ThemeRole::Unpublished, 30));
        let result = plan(
            &branch("feature/cart", &["abc123def Fix cart"]),
            &Stage::Backup,
            None,
            &themes,
            now(),
        )
        .unwrap();
        // Feature branches have no freshness limit.
        assert_eq!(result, Plan::DeployExisting { theme: themes[0].clone() });
    }

    #[test]
    fn test_staging_match_prefers_most_recent() {
        let themes = vec![
            theme(2, "STAGE - cart v2 (abc123)", ThemeRole::Unpublished, 1),
            theme(1, "STAGE - cart (abc123)", ThemeRole::Unpublished, 3),
            theme(9, "LIVE - main", ThemeRole::Main, 5),
        ];
        let found = find_staging_match(BranchKind::Feature, &["abc123".to_string()], &themes, now());
        assert_eq!(found.map(|t| t.id), Some(2));
    }

    #[test]
    fn test_live_theme_with_matching_commit_is_not_staging() {
        let themes = vec![theme(1, "LIVE - cart (abc123)", ThemeRole::Main, 1)];
        let found = find_staging_match(BranchKind::Feature, &["abc123".to_string()], &themes, now());
        assert!(found.is_none());
    }

    #[test]
    fn test_develop_rejects_stale_staging_theme() {
        let themes = vec![
            theme(5, "STAGE - develop (cafe01)", ThemeRole::Unpublished, 8),
            theme(20, "LIVE - Spring", ThemeRole::Main, 10),
        ];
        let result = plan(&branch("develop", &["cafe01 Merge"]), &Stage::Backup, None, &themes, now());
        match result.unwrap() {
            Plan::DuplicateAndDeploy { base } => assert_eq!(base.id, 20),
            other => panic!("Expected DuplicateAndDeploy, got {:?}", other),
        }
    }

    #[test]
    fn test_develop_accepts_recent_staging_theme() {
        let themes = vec![
            theme(5, "STAGE - develop (cafe01)", ThemeRole::Unpublished, 6),
            theme(20, "LIVE - Spring", ThemeRole::Main, 10),
        ];
        let result = plan(&branch("develop", &["cafe01 Merge"]), &Stage::Backup, None, &themes, now());
        assert_eq!(result.unwrap(), Plan::DeployExisting { theme: themes[0].clone() });
    }

    // --- Path B: master ---

    #[test]
    fn test_master_backup_duplicates_published() {
        let result = plan(&branch("master", &[]), &Stage::Backup, None, &store(), now()).unwrap();
        assert!(matches!(result, Plan::Backup { ref base } if base.id == 20));
    }

    #[test]
    fn test_master_deploy_targets_published() {
        let result = plan(&branch("master", &[]), &Stage::Deploy, None, &store(), now()).unwrap();
        assert!(matches!(result, Plan::DeployBase { ref base } if base.id == 20));
    }

    #[test]
    fn test_master_forces_published_even_when_dev() {
        let themes = vec![
            theme(1, "STAGE - y", ThemeRole::Unpublished, 1),
            theme(2, "DEV - x", ThemeRole::Main, 2),
        ];
        let result = plan(&branch("master", &[]), &Stage::Backup, None, &themes, now()).unwrap();
        assert!(matches!(result, Plan::Backup { ref base } if base.id == 2));
    }

    #[test]
    fn test_master_other_stage_is_idle() {
        let result = plan(
            &branch("master", &[]),
            &Stage::Other("rollback".to_string()),
            None,
            &store(),
            now(),
        )
        .unwrap();
        assert!(matches!(result, Plan::Idle { .. }));
    }

    #[test]
    fn test_other_branch_is_idle() {
        let result = plan(&branch("release/1.2", &[]), &Stage::Deploy, None, &store(), now()).unwrap();
        assert!(matches!(result, Plan::Idle { .. }));
    }

    // --- Base selection ---

    #[test]
    fn test_select_base_skips_dev_published() {
        let themes = vec![
            theme(1, "DEV - x", ThemeRole::Main, 0),
            theme(2, "STAGE - y", ThemeRole::Other, 0),
        ];
        let base = select_base(&themes, BaseRequest::default()).unwrap();
        assert_eq!(base.name, "STAGE - y");
    }

    #[test]
    fn test_select_base_uses_live_published() {
        let themes = store();
        let base = select_base(&themes, BaseRequest::default()).unwrap();
        assert_eq!(base.id, 20);
    }

    #[test]
    fn test_select_base_explicit_id_wins() {
        let themes = vec![
            theme(1, "LIVE - main", ThemeRole::Main, 0),
            theme(123, "DEV - scratch", ThemeRole::Development, 40),
        ];
        let request = BaseRequest {
            explicit_id: Some(123),
            force_published: true,
        };
        assert_eq!(select_base(&themes, request).unwrap().id, 123);
    }

    #[test]
    fn test_select_base_explicit_id_missing() {
        let request = BaseRequest {
            explicit_id: Some(999),
            force_published: false,
        };
        assert_eq!(select_base(&store(), request), Err(PlanError::BaseThemeNotFound(999)));
    }

    #[test]
    fn test_select_base_without_published_theme() {
        let themes = vec![theme(1, "LIVE - a", ThemeRole::Unpublished, 0)];
        assert_eq!(
            select_base(&themes, BaseRequest::default()),
            Err(PlanError::NoPublishedTheme)
        );
    }

    #[test]
    fn test_select_base_no_deployable_fallback() {
        let themes = vec![
            theme(1, "DEV - x", ThemeRole::Main, 0),
            theme(2, "Debut", ThemeRole::Unpublished, 0),
        ];
        assert_eq!(
            select_base(&themes, BaseRequest::default()),
            Err(PlanError::NoDeployableBase)
        );
    }

    #[test]
    fn test_plan_propagates_no_deployable_base() {
        let themes = vec![theme(1, "DEV - x", ThemeRole::Main, 0)];
        let result = plan(&branch("feature/a", &["abc"]), &Stage::Backup, None, &themes, now());
        assert_eq!(result, Err(PlanError::NoDeployableBase));
    }
}
