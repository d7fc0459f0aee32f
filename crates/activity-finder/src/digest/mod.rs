//! Digest assembly and delivery.
//!
//! For every configured rule the engine works out which current matches are
//! new since the previous run, then groups those per recipient so each
//! recipient gets a single email covering all of their rules.

mod email;
mod engine;
mod render;

pub use email::{DryRunNotifier, EmailSender, Notifier};
pub use engine::{
    filter_unseen, recipients_by_rule, Digest, DigestEngine, DigestSection, RuleOutcome,
};
pub use render::{render_activity, render_section};
