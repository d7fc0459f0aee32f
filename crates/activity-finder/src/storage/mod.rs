//! Persistent state.
//!
//! The only state kept between runs is the per-rule set of links that were
//! already part of a notification.

mod seen;

pub use seen::{FileSeenSetStore, MemorySeenSetStore, SeenSetStore};
