//! # PR Checklist Comment
//!
//! Renders a label set as the checklist comment and parses an edited checklist
//! back into checkbox flags. Both directions are driven by the same
//! [`SECTIONS`] table, so a line the renderer writes is always a line the
//! parser recognizes.
//!
//! ```markdown
//! ## PR Checklist
//!
//! ### Regression Fix (required)
//! - [x] This fixes a regression
//! - [ ] This is not a regression fix
//! ...
//! ```

use crate::labels::{Label, LabelCategory, LabelSet};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

/// First line of every checklist comment
pub const CHECKLIST_MARKER: &str = "## PR Checklist";

/// One `###` section of the checklist
pub struct Section {
    pub heading: &'static str,
    pub items: &'static [(Label, &'static str)],
}

/// Checklist layout, in rendering order
pub static SECTIONS: [Section; 3] = [
    Section {
        heading: "### Regression Fix (required)",
        items: &[
            (Label::RegressionFix, "This fixes a regression"),
            (Label::NotRegressionFix, "This is not a regression fix"),
        ],
    },
    Section {
        heading: "### Cherry-pick (only required for cp PRs)",
        items: &[(Label::CherryPick, "This is a cherry pick")],
    },
    Section {
        heading: "### Migrations (required)",
        items: &[
            (
                Label::MigrationOnpremLongRunning,
                "Long running migration expected for On-prem",
            ),
            (
                Label::MigrationCloudLongRunning,
                "Long running migration expected for Cloud",
            ),
            (Label::FastMigration, "Migration will complete quickly"),
            (Label::NoMigration, "No Migration Involved"),
        ],
    },
];

lazy_static! {
    /// One line-anchored matcher per checkbox; group 1 is the box state
    static ref CHECKBOX_PATTERNS: Vec<(Label, Regex)> = SECTIONS
        .iter()
        .flat_map(|section| section.items.iter())
        .map(|(label, text)| {
            let pattern = format!(r"(?m)^- \[([ xX])\] {}[ \t]*\r?$", regex::escape(text));
            (*label, Regex::new(&pattern).unwrap())
        })
        .collect();
}

/// Render the checklist body for a label set
#[must_use]
pub fn render(labels: &LabelSet) -> String {
    let mut lines = vec![CHECKLIST_MARKER.to_string()];

    for section in SECTIONS.iter() {
        lines.push(String::new());
        lines.push(section.heading.to_string());
        for (label, text) in section.items {
            let mark = if labels.contains(*label) { 'x' } else { ' ' };
            lines.push(format!("- [{mark}] {text}"));
        }
    }

    lines.join("\n")
}

/// Parse checkbox states out of a checklist body.
///
/// Lines that do not match a known checkbox are ignored; a missing checkbox
/// reads as unchecked.
#[must_use]
pub fn parse(body: &str) -> ChecklistFlags {
    let checked = CHECKBOX_PATTERNS
        .iter()
        .filter(|(_, pattern)| {
            pattern
                .captures(body)
                .and_then(|c| c.get(1))
                .is_some_and(|state| state.as_str().eq_ignore_ascii_case("x"))
        })
        .map(|(label, _)| *label)
        .collect();

    ChecklistFlags { checked }
}

/// Checkbox states read from a checklist comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChecklistFlags {
    checked: BTreeSet<Label>,
}

impl ChecklistFlags {
    #[must_use]
    pub fn is_checked(&self, label: Label) -> bool {
        self.checked.contains(&label)
    }

    /// Winning label for one category: first ticked box in priority order,
    /// falling back to the category default.
    #[must_use]
    pub fn winner(&self, category: LabelCategory) -> Label {
        category
            .labels()
            .iter()
            .copied()
            .find(|label| self.is_checked(*label))
            .unwrap_or_else(|| category.default_label())
    }

    /// One winning label per category
    #[must_use]
    pub fn winning_labels(&self) -> Vec<Label> {
        LabelCategory::ALL
            .into_iter()
            .map(|category| self.winner(category))
            .collect()
    }
}
