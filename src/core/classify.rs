// src/core/classify.rs

//! # Classifiers
//!
//! Turns the two free-form strings this tool reasons about, branch names and theme names,
//! into enumerated variants. Every pattern test lives here so the planner only ever
//! matches on `BranchKind` and `EnvironmentTag`.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref DEVELOP_RE: Regex = Regex::new(r"(?i)develop").expect("valid regex");
    static ref FEATURE_RE: Regex = Regex::new(r"(?i)feature|hotfix|bugfix").expect("valid regex");
    static ref MASTER_RE: Regex = Regex::new(r"(?i)master").expect("valid regex");
}

lazy_static! {
    // A parenthesised segment without nested parentheses, e.g. `(abc123)`.
    static ref COMMIT_TOKEN_RE: Regex = Regex::new(r"\(([^()]*)\)").expect("valid regex");
}

/// What kind of branch is checked out. Drives the top of the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    /// Integration branch. Reuses staging themes only while they are fresh.
    Develop,
    /// `feature/*`, `hotfix/*` and `bugfix/*` branches.
    Feature,
    /// The production branch. Backs up or deploys the published theme.
    Master,
    /// Anything else. No action is taken.
    Other,
}

impl BranchKind {
    /// Classifies a branch name. The first matching rule wins, so `feature/develop-x`
    /// is `Develop`.
    pub fn classify(branch: &str) -> Self {
        if DEVELOP_RE.is_match(branch) {
            BranchKind::Develop
        } else if FEATURE_RE.is_match(branch) {
            BranchKind::Feature
        } else if MASTER_RE.is_match(branch) {
            BranchKind::Master
        } else {
            BranchKind::Other
        }
    }

    /// The branch unmerged commits are listed against.
    pub fn base_branch(self) -> &'static str {
        match self {
            BranchKind::Develop => "master",
            _ => "develop",
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BranchKind::Develop => "develop",
            BranchKind::Feature => "feature",
            BranchKind::Master => "master",
            BranchKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// The environment a theme belongs to, read from the prefix of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentTag {
    /// `LIVE`, `PROD` or `PRODUCTION`.
    Live,
    /// `STAGE` or `STAGING`.
    Stage,
    /// `DEV`, `DEVELOP` or `DEVELOPMENT`.
    Dev,
    /// No recognised prefix.
    Unknown,
}

impl EnvironmentTag {
    /// Classifies the environment segment of a theme name, ignoring case.
    pub fn classify(segment: &str) -> Self {
        match segment.trim().to_ascii_lowercase().as_str() {
            "live" | "prod" | "production" => EnvironmentTag::Live,
            "stage" | "staging" => EnvironmentTag::Stage,
            "dev" | "develop" | "development" => EnvironmentTag::Dev,
            _ => EnvironmentTag::Unknown,
        }
    }

    /// Live and stage themes are safe to duplicate from.
    pub fn is_deployable_base(self) -> bool {
        matches!(self, EnvironmentTag::Live | EnvironmentTag::Stage)
    }
}

/// A theme name of the form `"<ENV> - <label>(<commit>)"`, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeName {
    /// The environment prefix, classified.
    pub tag: EnvironmentTag,
    /// The free text between the prefix and the commit token, e.g. `fix-bug`.
    pub label: String,
    /// The last parenthesised segment, trimmed. Empty when there is none.
    pub commit: String,
}

impl ThemeName {
    /// Parses a theme name. Never fails: unrecognised names yield `EnvironmentTag::Unknown`
    /// and an empty commit token.
    pub fn parse(name: &str) -> Self {
        let (environment, rest) = match name.split_once(" - ") {
            Some((env, rest)) => (env.trim(), rest),
            None => (name.trim(), ""),
        };

        let last_token = COMMIT_TOKEN_RE.captures_iter(rest).last();
        let commit = last_token
            .as_ref()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        let label = match last_token.as_ref().and_then(|caps| caps.get(0)) {
            Some(whole) => rest.get(..whole.start()).unwrap_or(rest),
            None => rest,
        };

        Self {
            tag: EnvironmentTag::classify(environment),
            label: label.trim().to_string(),
            commit,
        }
    }

    /// Returns true when this name carries a commit token that appears in any of `commits`.
    /// An empty token never matches.
    pub fn matches_any_commit(&self, commits: &[String]) -> bool {
        !self.commit.is_empty() && commits.iter().any(|c| c.contains(&self.commit))
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_classification() {
        assert_eq!(BranchKind::classify("develop"), BranchKind::Develop);
        assert_eq!(BranchKind::classify("feature/cart-drawer"), BranchKind::Feature);
        assert_eq!(BranchKind::classify("HOTFIX/price-rounding"), BranchKind::Feature);
        assert_eq!(BranchKind::classify("bugfix/123"), BranchKind::Feature);
        assert_eq!(BranchKind::classify("master"), BranchKind::Master);
        assert_eq!(BranchKind::classify("release/2.0"), BranchKind::Other);
    }

    #[test]
    fn test_branch_classification_first_rule_wins() {
        assert_eq!(BranchKind::classify("feature/develop-tools"), BranchKind::Develop);
        assert_eq!(BranchKind::classify("hotfix/master-menu"), BranchKind::Feature);
    }

    #[test]
    fn test_base_branch() {
        assert_eq!(BranchKind::Develop.base_branch(), "master");
        assert_eq!(BranchKind::Feature.base_branch(), "develop");
        assert_eq!(BranchKind::Master.base_branch(), "develop");
    }

    #[test]
    fn test_environment_tag() {
        assert_eq!(EnvironmentTag::classify("LIVE"), EnvironmentTag::Live);
        assert_eq!(EnvironmentTag::classify("Staging"), EnvironmentTag::Stage);
        assert_eq!(EnvironmentTag::classify("stage"), EnvironmentTag::Stage);
        assert_eq!(EnvironmentTag::classify("DEV"), EnvironmentTag::Dev);
        assert_eq!(EnvironmentTag::classify("Debut"), EnvironmentTag::Unknown);
        assert!(EnvironmentTag::Live.is_deployable_base());
        assert!(!EnvironmentTag::Dev.is_deployable_base());
    }

    #[test]
    fn test_parse_name_with_commit() {
        let name = ThemeName::parse("STAGE - fix-bug (abc123)");
        assert_eq!(name.tag, EnvironmentTag::Stage);
        assert_eq!(name.label, "fix-bug");
        assert_eq!(name.commit, "abc123");
    }

    #[test]
    fn test_parse_name_without_commit() {
        let name = ThemeName::parse("LIVE - Spring collection");
        assert_eq!(name.tag, EnvironmentTag::Live);
        assert_eq!(name.label, "Spring collection");
        assert_eq!(name.commit, "");
    }

    #[test]
    fn test_parse_name_without_separator() {
        let name = ThemeName::parse("Debut");
        assert_eq!(name.tag, EnvironmentTag::Unknown);
        assert_eq!(name.label, "");
        assert_eq!(name.commit, "");
    }

    #[test]
    fn test_parse_name_uses_last_parenthesised_segment() {
        let name = ThemeName::parse("STAGE - menu (mobile)(9f8e7d)");
        assert_eq!(name.commit, "9f8e7d");
        assert_eq!(name.label, "menu (mobile)");
    }

    #[test]
    fn test_matches_any_commit() {
        let commits = vec![
            "9f8e7d6c5b4a Fix cart rounding".to_string(),
            "0123456789ab Add badge".to_string(),
        ];
        assert!(ThemeName::parse("STAGE - cart (9f8e7d)").matches_any_commit(&commits));
        assert!(!ThemeName::parse("STAGE - cart (ffffff)").matches_any_commit(&commits));
        assert!(!ThemeName::parse("STAGE - cart").matches_any_commit(&commits));
        assert!(!ThemeName::parse("STAGE - cart ()").matches_any_commit(&commits));
    }
}
