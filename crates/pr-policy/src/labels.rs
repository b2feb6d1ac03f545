//! # PR Metadata Labels
//!
//! Every pull request declares three things through labels: whether it fixes a
//! regression, whether it is a cherry-pick, and what kind of migration it
//! ships. Each declaration is a [`LabelCategory`] holding a small, ordered set
//! of mutually exclusive [`Label`]s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A policy label known to this tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    RegressionFix,
    NotRegressionFix,
    CherryPick,
    NotCherryPick,
    MigrationOnpremLongRunning,
    MigrationCloudLongRunning,
    FastMigration,
    NoMigration,
}

impl Label {
    /// Label name as it appears on GitHub
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegressionFix => "regression-fix",
            Self::NotRegressionFix => "not-regression-fix",
            Self::CherryPick => "cherry-pick",
            Self::NotCherryPick => "not-cherry-pick",
            Self::MigrationOnpremLongRunning => "migration-onprem-long-running",
            Self::MigrationCloudLongRunning => "migration-cloud-long-running",
            Self::FastMigration => "fast-migration",
            Self::NoMigration => "no-migration",
        }
    }

    /// Category this label belongs to
    #[must_use]
    pub const fn category(self) -> LabelCategory {
        match self {
            Self::RegressionFix | Self::NotRegressionFix => LabelCategory::RegressionFix,
            Self::CherryPick | Self::NotCherryPick => LabelCategory::CherryPick,
            Self::MigrationOnpremLongRunning
            | Self::MigrationCloudLongRunning
            | Self::FastMigration
            | Self::NoMigration => LabelCategory::Migration,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of mutually exclusive labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LabelCategory {
    RegressionFix,
    CherryPick,
    Migration,
}

impl LabelCategory {
    pub const ALL: [LabelCategory; 3] = [
        LabelCategory::RegressionFix,
        LabelCategory::CherryPick,
        LabelCategory::Migration,
    ];

    /// Labels in declared priority order; the first checked one wins
    #[must_use]
    pub const fn labels(self) -> &'static [Label] {
        match self {
            Self::RegressionFix => &[Label::RegressionFix, Label::NotRegressionFix],
            Self::CherryPick => &[Label::CherryPick, Label::NotCherryPick],
            Self::Migration => &[
                Label::MigrationOnpremLongRunning,
                Label::MigrationCloudLongRunning,
                Label::FastMigration,
                Label::NoMigration,
            ],
        }
    }

    /// Negative label applied when nothing in the category is checked
    #[must_use]
    pub const fn default_label(self) -> Label {
        match self {
            Self::RegressionFix => Label::NotRegressionFix,
            Self::CherryPick => Label::NotCherryPick,
            Self::Migration => Label::NoMigration,
        }
    }

    /// Human readable name used in remediation messages
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::RegressionFix => "regression fix",
            Self::CherryPick => "cherry-pick",
            Self::Migration => "migration",
        }
    }
}

impl fmt::Display for LabelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Label names currently attached to a pull request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    #[must_use]
    pub fn contains(&self, label: Label) -> bool {
        self.0.contains(label.as_str())
    }

    /// Labels of `category` present in the set, in priority order
    #[must_use]
    pub fn in_category(&self, category: LabelCategory) -> Vec<Label> {
        category
            .labels()
            .iter()
            .copied()
            .filter(|label| self.contains(*label))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<&[Label]> for LabelSet {
    fn from(labels: &[Label]) -> Self {
        labels.iter().map(|label| label.as_str()).collect()
    }
}

/// Labels to add and remove to reach a target state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelDelta {
    pub add: Vec<Label>,
    pub remove: Vec<Label>,
}

impl LabelDelta {
    /// Delta that makes `winners` the only policy labels of their categories
    #[must_use]
    pub fn between(current: &LabelSet, winners: &[Label]) -> Self {
        let mut delta = Self::default();

        for winner in winners {
            if !current.contains(*winner) {
                delta.add.push(*winner);
            }
            delta.remove.extend(
                current
                    .in_category(winner.category())
                    .into_iter()
                    .filter(|present| present != winner),
            );
        }

        delta
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}
