//! Activity finder for The Mountaineers activity listings.
//!
//! This crate provides:
//! - Paginated fetching and parsing of the activity search results
//! - Named matching rules over normalized activities
//! - Per-rule seen-sets so each activity is announced once
//! - Per-recipient HTML digests delivered by email
//! - A fixed-interval scheduler driving the whole pipeline

pub mod config;
pub mod digest;
pub mod error;
pub mod listing;
pub mod pipeline;
pub mod rules;
pub mod scheduler;
pub mod storage;

// Re-export main types
pub use config::{PrivateConfig, PublicConfig, RuleGroup};
pub use digest::{Digest, DigestEngine, DigestSection, EmailSender, Notifier};
pub use error::{FinderError, Result};
pub use listing::{Activity, RawActivity, RegistrationStatus};
pub use pipeline::{CycleReport, Pipeline};
pub use rules::{CriteriaRule, Rule, RuleRegistry};
pub use scheduler::Scheduler;
pub use storage::{FileSeenSetStore, SeenSetStore};
