//! Declarative rules built from a conjunction of criteria.

use serde::{Deserialize, Serialize};

use super::Rule;
use crate::listing::{Activity, RegistrationStatus};

/// Which availability count a rule checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityKind {
    /// Participant spots.
    #[default]
    Participant,
    /// Leader spots.
    Leader,
}

impl AvailabilityKind {
    fn count(self, activity: &Activity) -> i32 {
        match self {
            Self::Participant => activity.participant_availability,
            Self::Leader => activity.leader_availability,
        }
    }
}

/// A rule that matches activities of given types with open spots.
///
/// Matches when all of these hold:
/// - the activity type is one of `types`
/// - the difficulty is one of `difficulties`, if any are given
/// - the chosen availability count is strictly positive (waitlists never match)
/// - registration is not closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaRule {
    /// Rule name used in configuration and for the seen-set file.
    pub name: String,
    /// Accepted activity types.
    pub types: Vec<String>,
    /// Accepted difficulties; empty accepts any.
    #[serde(default)]
    pub difficulties: Vec<String>,
    /// Availability count to check.
    #[serde(default)]
    pub availability: AvailabilityKind,
}

impl CriteriaRule {
    /// Create a rule matching the given types on participant availability.
    #[must_use]
    pub fn new(name: impl Into<String>, types: &[&str]) -> Self {
        Self {
            name: name.into(),
            types: types.iter().map(ToString::to_string).collect(),
            difficulties: Vec::new(),
            availability: AvailabilityKind::Participant,
        }
    }

    /// Restrict to the given difficulties.
    #[must_use]
    pub fn with_difficulties(mut self, difficulties: &[&str]) -> Self {
        self.difficulties = difficulties.iter().map(ToString::to_string).collect();
        self
    }

    /// Check a different availability count.
    #[must_use]
    pub fn with_availability(mut self, availability: AvailabilityKind) -> Self {
        self.availability = availability;
        self
    }
}

impl Rule for CriteriaRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, activity: &Activity) -> bool {
        self.types.iter().any(|t| *t == activity.activity_type)
            && (self.difficulties.is_empty()
                || self.difficulties.iter().any(|d| *d == activity.difficulty))
            && self.availability.count(activity) > 0
            && activity.registration_status != RegistrationStatus::Closed
    }
}

/// Basic alpine climbs with open participant spots.
#[must_use]
pub fn basic_climbing_rule() -> CriteriaRule {
    CriteriaRule::new("BasicClimbingRule", &["Basic Alpine Climb"])
}

/// Beginner-friendly sea kayak trips with open participant spots.
#[must_use]
pub fn easy_kayaking_rule() -> CriteriaRule {
    CriteriaRule::new("EasyKayakingRule", &["Sea Kayak"]).with_difficulties(&[
        "Sea Kayak I",
        "Sea Kayak II",
        "Sea Kayak II+",
        "Sea Kayak I/II",
    ])
}

/// Scrambles that still need leaders.
#[must_use]
pub fn scramble_leader_rule() -> CriteriaRule {
    CriteriaRule::new("ScrambleLeaderRule", &["Scramble"]).with_availability(AvailabilityKind::Leader)
}
