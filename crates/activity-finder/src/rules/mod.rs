//! Matching rules and the registry that names them.

mod criteria;

use std::collections::HashMap;

pub use criteria::{
    basic_climbing_rule, easy_kayaking_rule, scramble_leader_rule, AvailabilityKind, CriteriaRule,
};

use crate::error::{FinderError, Result};
use crate::listing::Activity;

/// A named predicate over activities.
///
/// Rules are pure: the same activity always gives the same answer.
pub trait Rule: Send + Sync {
    /// Name the rule is registered and configured under.
    fn name(&self) -> &str;

    /// Whether the activity is of interest.
    fn matches(&self, activity: &Activity) -> bool;

    /// Filter activities, keeping input order.
    fn filter<'a>(&self, activities: &'a [Activity]) -> Vec<&'a Activity> {
        activities.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Rules keyed by name.
#[derive(Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in rules.
    #[must_use]
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        registry.register(basic_climbing_rule());
        registry.register(easy_kayaking_rule());
        registry.register(scramble_leader_rule());
        registry
    }

    /// Register a rule, replacing any rule with the same name.
    pub fn register(&mut self, rule: impl Rule + 'static) {
        let name = rule.name().to_string();
        if self.rules.insert(name.clone(), Box::new(rule)).is_some() {
            tracing::debug!(rule = %name, "Replaced registered rule");
        }
    }

    /// Look up a rule by name.
    pub fn get(&self, name: &str) -> Result<&dyn Rule> {
        self.rules
            .get(name)
            .map(|rule| &**rule)
            .ok_or_else(|| FinderError::RuleNotFound {
                name: name.to_string(),
            })
    }

    /// Whether a rule with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered rule names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
