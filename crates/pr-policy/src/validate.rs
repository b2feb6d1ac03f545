//! # PR Metadata Validation
//!
//! Checks a pull request's labels and description against the metadata
//! policy and returns the list of [`Remediation`]s still outstanding. Only
//! labels and the raw PR body are inspected; the checklist comment is never
//! read here.
//!
//! ## Body contracts
//!
//! A `cherry-pick` PR must say where the issue was found:
//!
//! ```text
//! This is a fix for an issue found on: staging, via: user report
//! ```
//!
//! A `regression-fix` PR must link the pull request that introduced it:
//!
//! ```text
//! This fixes a regression introduced by https://github.com/acme/widgets/pull/123
//! ```

use crate::config::Config;
use crate::error::{PolicyError, Result};
use crate::labels::{Label, LabelCategory, LabelSet};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::debug;

lazy_static! {
    static ref CHERRY_PICK_ORIGIN_PATTERN: Regex = Regex::new(
        r"(?m)^This is a fix for an issue found on: (?P<environment>admin|staging|production), via: (?P<source>user report|automated test|observability)"
    )
    .unwrap();
}

/// Line template shown when the cherry-pick statement is missing
pub const CHERRY_PICK_TEMPLATE: &str = "This is a fix for an issue found on: [admin/staging/production], via: [user report/automated test/observability]";

/// Line template shown when the regression link is missing
pub const REGRESSION_TEMPLATE: &str = "This fixes a regression introduced by [insert link to PR here]";

/// Environment a cherry-picked fix was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Admin,
    Staging,
    Production,
}

/// How the issue behind a cherry-pick was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    UserReport,
    AutomatedTest,
    Observability,
}

/// Parsed cherry-pick statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CherryPickOrigin {
    pub environment: Environment,
    pub source: DetectionSource,
}

/// Parsed regression statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegressionSource {
    /// Number of the pull request that introduced the regression
    pub pull_request: u64,
}

/// Read the cherry-pick statement from a PR body, if present and well formed
#[must_use]
pub fn cherry_pick_origin(body: &str) -> Option<CherryPickOrigin> {
    let captures = CHERRY_PICK_ORIGIN_PATTERN.captures(body)?;

    let environment = match captures.name("environment")?.as_str() {
        "admin" => Environment::Admin,
        "staging" => Environment::Staging,
        "production" => Environment::Production,
        _ => return None,
    };
    let source = match captures.name("source")?.as_str() {
        "user report" => DetectionSource::UserReport,
        "automated test" => DetectionSource::AutomatedTest,
        "observability" => DetectionSource::Observability,
        _ => return None,
    };

    Some(CherryPickOrigin {
        environment,
        source,
    })
}

/// An unmet policy requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Remediation {
    /// Zero or several labels of one category are present
    ChooseExactlyOne { category: LabelCategory },
    /// `cherry-pick` without a valid origin statement
    CherryPickOrigin,
    /// `regression-fix` without a link to the offending pull request
    RegressionSource,
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChooseExactlyOne { category } => {
                let names: Vec<&str> = category
                    .labels()
                    .iter()
                    .map(|label| label.as_str())
                    .collect();
                write!(f, "Add only ONE of these labels to your PR: {}", names.join(","))
            }
            Self::CherryPickOrigin => write!(
                f,
                "Since your PR is a cherry-pick, please add the following line to your PR and choose the appropriate environment and source: <pre>{CHERRY_PICK_TEMPLATE}</pre>"
            ),
            Self::RegressionSource => write!(
                f,
                "Since your PR is a regression-fix, please add the following line to your PR: <pre>{REGRESSION_TEMPLATE}</pre>"
            ),
        }
    }
}

/// Label and PR body policy checks
#[derive(Debug, Clone)]
pub struct Validator {
    regression_pattern: Regex,
}

impl Validator {
    pub fn new(config: &Config) -> Result<Self> {
        let regression_pattern = Regex::new(&format!(
            r"(?m)^This fixes a regression introduced by {}(?P<number>\d+)[ \t]*\r?$",
            regex::escape(&config.pull_request_url_prefix())
        ))
        .map_err(|e| PolicyError::Config(format!("invalid regression pattern: {e}")))?;

        Ok(Self { regression_pattern })
    }

    /// Read the regression statement from a PR body, if present and well formed
    #[must_use]
    pub fn regression_source(&self, body: &str) -> Option<RegressionSource> {
        let number = self
            .regression_pattern
            .captures(body)?
            .name("number")?
            .as_str()
            .parse()
            .ok()?;
        Some(RegressionSource {
            pull_request: number,
        })
    }

    /// All outstanding remediations, in a stable order
    #[must_use]
    pub fn validate(&self, labels: &LabelSet, body: &str) -> Vec<Remediation> {
        let mut remediations = Vec::new();

        // Body contracts only apply once the category is unambiguous
        if check_exclusive(labels, LabelCategory::CherryPick, &mut remediations)
            && labels.contains(Label::CherryPick)
            && cherry_pick_origin(body).is_none()
        {
            remediations.push(Remediation::CherryPickOrigin);
        }

        if check_exclusive(labels, LabelCategory::RegressionFix, &mut remediations)
            && labels.contains(Label::RegressionFix)
            && self.regression_source(body).is_none()
        {
            remediations.push(Remediation::RegressionSource);
        }

        check_exclusive(labels, LabelCategory::Migration, &mut remediations);

        debug!(count = remediations.len(), "Validated PR metadata");
        remediations
    }
}

/// Push the category remediation unless exactly one of its labels is present
fn check_exclusive(
    labels: &LabelSet,
    category: LabelCategory,
    remediations: &mut Vec<Remediation>,
) -> bool {
    if labels.in_category(category).len() == 1 {
        return true;
    }
    remediations.push(Remediation::ChooseExactlyOne { category });
    false
}
