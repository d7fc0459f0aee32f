//! Finder pipeline - one fetch, match, dedup, and notify pass.

use std::sync::Arc;

use crate::config::PublicConfig;
use crate::digest::{DigestEngine, Notifier};
use crate::error::Result;
use crate::listing::{fetch_all_activities, ListingSource};
use crate::rules::RuleRegistry;
use crate::storage::SeenSetStore;

/// Result of a single cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Activities fetched and normalized.
    pub fetched: usize,
    /// Recipients with new matches.
    pub digests: usize,
    /// Emails sent.
    pub sent: usize,
}

/// Finder pipeline orchestrator.
pub struct Pipeline {
    config: PublicConfig,
    registry: RuleRegistry,
    source: Arc<dyn ListingSource>,
    store: Arc<dyn SeenSetStore>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    /// Create a pipeline, checking that every configured rule exists.
    pub fn new(
        config: PublicConfig,
        registry: RuleRegistry,
        source: Arc<dyn ListingSource>,
        store: Arc<dyn SeenSetStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate(&registry)?;
        Ok(Self {
            config,
            registry,
            source,
            store,
            notifier,
        })
    }

    /// Run one cycle.
    ///
    /// Seen-sets are written before any email goes out. Any error aborts the
    /// rest of the cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        tracing::info!("Starting cycle");

        let activities = fetch_all_activities(self.source.as_ref()).await?;

        let engine = DigestEngine::new(&self.registry, self.store.as_ref());
        let digests = engine.compute_digests(&activities, &self.config.rules)?;

        let mut report = CycleReport {
            fetched: activities.len(),
            digests: digests.len(),
            sent: 0,
        };

        for (recipient, digest) in &digests {
            let address = self.config.recipient_address(recipient);
            let html = self.config.render_email(&digest.body(), recipient);

            tracing::info!(
                recipient = %recipient,
                address = %address,
                sections = digest.sections.len(),
                activities = digest.activity_count(),
                "Sending digest"
            );
            self.notifier
                .send(&address, &self.config.email_subject, &html)
                .await?;
            report.sent += 1;
        }

        tracing::info!(
            fetched = report.fetched,
            digests = report.digests,
            sent = report.sent,
            "Cycle complete"
        );
        Ok(report)
    }
}
