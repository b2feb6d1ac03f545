#![warn(clippy::pedantic)]
// =============================================================================
// Clippy Pedantic Lint Configuration
// =============================================================================
// Documentation: error sections are implied by the Result types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
// Not all functions need #[must_use]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
// Allow module_name in type names for clarity in public API
#![allow(clippy::module_name_repetitions)]
// Methods take &self for consistency even when not currently needed
#![allow(clippy::unused_self)]

//! # PR Policy
//!
//! Enforces pull request metadata policy on GitHub. Every PR declares, through
//! labels and its description, whether it fixes a regression, whether it is a
//! cherry-pick, and what migration it carries.
//!
//! ## Modules
//!
//! - [`labels`] - Policy labels, categories, and label deltas
//! - [`checklist`] - Render and parse the checklist comment
//! - [`sync`] - Keep the checklist comment and labels in agreement
//! - [`validate`] - Check labels and PR body against the policy
//! - [`remediation`] - Publish outstanding remediations as a PR comment
//! - [`store`] - Comment/label store seam and the dry-run wrapper
//! - [`github`] - GitHub REST implementation of the store
//! - [`event`] - Parse the GitHub Actions trigger payload
//! - [`config`] - Runtime configuration

pub mod checklist;
pub mod config;
pub mod error;
pub mod event;
pub mod github;
pub mod labels;
pub mod remediation;
pub mod store;
pub mod sync;
pub mod validate;

// Re-export key types for convenience
pub use config::{Config, RepoSlug};
pub use error::{GitHubError, PolicyError, Result};
pub use event::Trigger;
pub use github::GitHubClient;
pub use labels::{Label, LabelCategory, LabelDelta, LabelSet};
pub use remediation::{PublishOutcome, RemediationPublisher};
pub use store::{Comment, DryRunStore, PrRef, PrStore};
pub use sync::{ChecklistSync, SyncOutcome};
pub use validate::{Remediation, Validator};
