//! Digest computation: rule matching, seen-set deduplication, and grouping
//! of new matches by recipient.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::render::render_section;
use crate::config::RuleGroup;
use crate::error::Result;
use crate::listing::Activity;
use crate::rules::{Rule, RuleRegistry};
use crate::storage::SeenSetStore;

/// New matches of one rule within a digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSection {
    /// Rule that produced the matches.
    pub rule_name: String,
    /// Matches not seen in the previous run, in listing order.
    pub activities: Vec<Activity>,
}

impl DigestSection {
    /// Render as HTML.
    #[must_use]
    pub fn render(&self) -> String {
        render_section(&self.rule_name, &self.activities)
    }
}

/// Everything one recipient should hear about in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Recipient name token.
    pub recipient: String,
    /// Non-empty sections in rule group order.
    pub sections: Vec<DigestSection>,
}

impl Digest {
    /// Concatenated HTML of all sections.
    #[must_use]
    pub fn body(&self) -> String {
        self.sections.iter().map(DigestSection::render).collect()
    }

    /// Total activities across sections.
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.sections.iter().map(|s| s.activities.len()).sum()
    }
}

/// Outcome of evaluating one rule against the current listings.
#[derive(Debug, Clone, Default)]
pub struct RuleOutcome {
    /// Number of current matches.
    pub matched: usize,
    /// Matches absent from the previous seen-set, in listing order.
    pub unseen: Vec<Activity>,
}

/// Computes per-recipient digests from the current listings.
pub struct DigestEngine<'a> {
    registry: &'a RuleRegistry,
    store: &'a dyn SeenSetStore,
}

impl<'a> DigestEngine<'a> {
    /// Create an engine over a rule registry and a seen-set store.
    #[must_use]
    pub fn new(registry: &'a RuleRegistry, store: &'a dyn SeenSetStore) -> Self {
        Self { registry, store }
    }

    /// Compute the digests for this run.
    ///
    /// Each rule referenced by a group is evaluated once, and its seen-set is
    /// overwritten with the full current match set. Only recipients with at
    /// least one new match get an entry.
    pub fn compute_digests(
        &self,
        activities: &[Activity],
        rule_groups: &[RuleGroup],
    ) -> Result<BTreeMap<String, Digest>> {
        let mut unseen_by_rule: HashMap<&str, Vec<Activity>> = HashMap::new();
        for group in rule_groups {
            let name = group.rule_name.as_str();
            if unseen_by_rule.contains_key(name) {
                continue;
            }
            let rule = self.registry.get(name)?;
            let outcome = self.evaluate_rule(rule, activities)?;
            tracing::info!(
                rule = name,
                total = activities.len(),
                matched = outcome.matched,
                unseen = outcome.unseen.len(),
                "Evaluated rule"
            );
            unseen_by_rule.insert(name, outcome.unseen);
        }

        let mut digests = BTreeMap::new();
        for (recipient, rule_names) in recipients_by_rule(rule_groups) {
            let sections: Vec<DigestSection> = rule_names
                .into_iter()
                .filter_map(|name| {
                    let unseen = unseen_by_rule.get(name)?;
                    (!unseen.is_empty()).then(|| DigestSection {
                        rule_name: name.to_string(),
                        activities: unseen.clone(),
                    })
                })
                .collect();

            if sections.is_empty() {
                tracing::debug!(recipient, "Nothing new for recipient");
                continue;
            }
            digests.insert(
                recipient.to_string(),
                Digest {
                    recipient: recipient.to_string(),
                    sections,
                },
            );
        }

        Ok(digests)
    }

    /// Match one rule, diff against its seen-set, and store the new seen-set.
    pub fn evaluate_rule(&self, rule: &dyn Rule, activities: &[Activity]) -> Result<RuleOutcome> {
        let matched = rule.filter(activities);
        let previously_seen = self.store.load(rule.name())?;
        let unseen = filter_unseen(&matched, &previously_seen)
            .into_iter()
            .cloned()
            .collect();

        let links: Vec<String> = matched.iter().map(|a| a.link.clone()).collect();
        self.store.save(rule.name(), &links)?;

        Ok(RuleOutcome {
            matched: matched.len(),
            unseen,
        })
    }
}

/// Keep the matches whose link is not in `previously_seen`, preserving order.
#[must_use]
pub fn filter_unseen<'a>(
    matched: &[&'a Activity],
    previously_seen: &HashSet<String>,
) -> Vec<&'a Activity> {
    matched
        .iter()
        .copied()
        .filter(|a| !previously_seen.contains(&a.link))
        .collect()
}

/// Invert rule groups into recipient → rule names.
///
/// Rule names keep group order and appear once per recipient.
#[must_use]
pub fn recipients_by_rule(rule_groups: &[RuleGroup]) -> BTreeMap<&str, Vec<&str>> {
    let mut recipients: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for group in rule_groups {
        for recipient in &group.distribution_lists {
            let rules = recipients.entry(recipient.as_str()).or_default();
            if !rules.contains(&group.rule_name.as_str()) {
                rules.push(group.rule_name.as_str());
            }
        }
    }
    recipients
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::CriteriaRule;
    use crate::storage::MemorySeenSetStore;
    use crate::testing::activity;

    fn kayak(link: &str) -> Activity {
        let mut a = activity(link);
        a.activity_type = "Sea Kayak".to_string();
        a.difficulty = "Sea Kayak II".to_string();
        a
    }

    fn links(activities: &[Activity]) -> Vec<&str> {
        activities.iter().map(|a| a.link.as_str()).collect()
    }

    #[test]
    fn test_filter_unseen_preserves_order() {
        let activities = vec![activity("L1"), activity("L2"), activity("L3")];
        let matched: Vec<&Activity> = activities.iter().collect();
        let seen = HashSet::from(["L1".to_string(), "L2".to_string()]);

        let unseen = filter_unseen(&matched, &seen);
        assert_eq!(unseen.len(), 1);
        assert_eq!(unseen[0].link, "L3");
    }

    #[test]
    fn test_evaluate_rule_overwrites_seen_set() {
        let registry = RuleRegistry::with_builtin_rules();
        let store = MemorySeenSetStore::new();
        store
            .save("BasicClimbingRule", &["L1".to_string(), "gone".to_string()])
            .unwrap();
        let engine = DigestEngine::new(&registry, &store);

        let rule = registry.get("BasicClimbingRule").unwrap();
        let outcome = engine
            .evaluate_rule(rule, &[activity("L1"), kayak("K1"), activity("L2")])
            .unwrap();

        assert_eq!(outcome.matched, 2);
        assert_eq!(links(&outcome.unseen), vec!["L2"]);
        assert_eq!(
            store.saved("BasicClimbingRule").unwrap(),
            vec!["L1".to_string(), "L2".to_string()]
        );
    }

    #[test]
    fn test_zero_matches_clears_history() {
        let registry = RuleRegistry::with_builtin_rules();
        let store = MemorySeenSetStore::new();
        let engine = DigestEngine::new(&registry, &store);
        let groups = vec![RuleGroup::new("BasicClimbingRule", &["alice"])];

        let first = engine.compute_digests(&[activity("L1")], &groups).unwrap();
        assert_eq!(first["alice"].activity_count(), 1);

        let mut full = activity("L1");
        full.participant_availability = -1;
        let second = engine.compute_digests(&[full], &groups).unwrap();
        assert!(second.is_empty());
        assert_eq!(store.saved("BasicClimbingRule").unwrap(), Vec::<String>::new());

        let third = engine.compute_digests(&[activity("L1")], &groups).unwrap();
        assert_eq!(links(&third["alice"].sections[0].activities), vec!["L1"]);
    }

    #[test]
    fn test_recipient_fan_in() {
        let mut registry = RuleRegistry::new();
        registry.register(CriteriaRule::new("RuleA", &["Basic Alpine Climb"]));
        registry.register(CriteriaRule::new("RuleB", &["Sea Kayak"]));
        let store = MemorySeenSetStore::new();
        let engine = DigestEngine::new(&registry, &store);

        let groups = vec![
            RuleGroup::new("RuleA", &["alice"]),
            RuleGroup::new("RuleB", &["alice", "bob"]),
        ];
        let digests = engine
            .compute_digests(&[activity("A1"), kayak("B1")], &groups)
            .unwrap();

        assert_eq!(digests.len(), 2);
        let alice: Vec<_> = digests["alice"].sections.iter().map(|s| s.rule_name.as_str()).collect();
        assert_eq!(alice, vec!["RuleA", "RuleB"]);
        let bob: Vec<_> = digests["bob"].sections.iter().map(|s| s.rule_name.as_str()).collect();
        assert_eq!(bob, vec!["RuleB"]);
    }

    #[test]
    fn test_no_content_suppression() {
        let registry = RuleRegistry::with_builtin_rules();
        let store = MemorySeenSetStore::new();
        store.save("BasicClimbingRule", &["L1".to_string()]).unwrap();
        let engine = DigestEngine::new(&registry, &store);

        let groups = vec![
            RuleGroup::new("BasicClimbingRule", &["alice", "bob"]),
            RuleGroup::new("EasyKayakingRule", &["bob"]),
        ];
        let digests = engine
            .compute_digests(&[activity("L1"), kayak("K1")], &groups)
            .unwrap();

        assert!(!digests.contains_key("alice"));
        assert_eq!(digests["bob"].sections.len(), 1);
        assert_eq!(digests["bob"].sections[0].rule_name, "EasyKayakingRule");
    }

    #[test]
    fn test_shared_rule_evaluated_once() {
        let registry = RuleRegistry::with_builtin_rules();
        let store = MemorySeenSetStore::new();
        let engine = DigestEngine::new(&registry, &store);

        // A second evaluation would see L1 as already seen and drop bob's section.
        let groups = vec![
            RuleGroup::new("BasicClimbingRule", &["alice", "alice"]),
            RuleGroup::new("BasicClimbingRule", &["bob"]),
        ];
        let digests = engine.compute_digests(&[activity("L1")], &groups).unwrap();

        assert_eq!(digests["alice"].sections.len(), 1);
        assert_eq!(digests["bob"].sections.len(), 1);
    }

    #[test]
    fn test_unknown_rule_fails() {
        let registry = RuleRegistry::new();
        let store = MemorySeenSetStore::new();
        let engine = DigestEngine::new(&registry, &store);

        let result = engine.compute_digests(&[], &[RuleGroup::new("Missing", &["alice"])]);
        assert!(matches!(
            result,
            Err(crate::error::FinderError::RuleNotFound { .. })
        ));
    }

    #[test]
    fn test_digest_body_concatenates_sections() {
        let digest = Digest {
            recipient: "alice".to_string(),
            sections: vec![
                DigestSection {
                    rule_name: "RuleA".to_string(),
                    activities: vec![activity("A1")],
                },
                DigestSection {
                    rule_name: "RuleB".to_string(),
                    activities: vec![activity("B1"), activity("B2")],
                },
            ],
        };

        let body = digest.body();
        let a = body.find("<h2>RuleA</h2>").unwrap();
        let b = body.find("<h2>RuleB</h2>").unwrap();
        assert!(a < b);
        assert_eq!(digest.activity_count(), 3);
    }
}
