//! Listing data types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One listing entry as extracted from the page, all strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawActivity {
    /// Link to the activity page.
    pub link: String,
    /// Activity type, e.g. "Basic Alpine Climb".
    pub activity_type: String,
    /// Activity name.
    pub name: String,
    /// Start date as displayed.
    pub start_date: String,
    /// End date as displayed, empty for single-day trips.
    pub end_date: String,
    /// Participant availability text, e.g. "3 spots" or "2 on waitlist".
    pub participant_availability: String,
    /// Leader availability text, may be empty.
    pub leader_availability: String,
    /// Registration text, e.g. "Registration closes Jun 1".
    pub registration_info: String,
    /// Difficulty rating, empty if not listed.
    pub difficulty: String,
    /// Prerequisites, empty if not listed.
    pub prereqs: String,
    /// Owning branch, empty if not listed.
    pub branch: String,
}

/// Registration state derived from the registration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Registration has not opened yet.
    NotYetOpen,
    /// Registration is closed.
    Closed,
    /// Registration is open.
    Open,
}

impl RegistrationStatus {
    /// Classify a registration text.
    ///
    /// "opens" takes precedence over "closed", so "Registration opens Jun 1,
    /// closed after Jun 9" is still not yet open.
    #[must_use]
    pub fn from_info(info: &str) -> Self {
        let lower = info.to_lowercase();
        if lower.contains("opens") {
            Self::NotYetOpen
        } else if lower.contains("closed") {
            Self::Closed
        } else {
            Self::Open
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotYetOpen => "Not yet open",
            Self::Closed => "Closed",
            Self::Open => "Open",
        };
        write!(f, "{s}")
    }
}

/// A normalized activity.
///
/// `link` is the identity of an activity across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Link to the activity page, unique and stable.
    pub link: String,
    /// Activity type.
    pub activity_type: String,
    /// Activity name.
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, if the trip spans several days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Open participant spots; negative is the waitlist depth.
    pub participant_availability: i32,
    /// Open leader spots; negative is the waitlist depth.
    pub leader_availability: i32,
    /// Registration state.
    pub registration_status: RegistrationStatus,
    /// Registration text as displayed.
    pub registration_info: String,
    /// Difficulty rating.
    pub difficulty: String,
    /// Prerequisites.
    pub prereqs: String,
    /// Owning branch.
    pub branch: String,
    /// Inclusive length in days.
    pub number_of_days: i64,
}

impl Activity {
    /// Whether participants are stuck on a waitlist.
    #[must_use]
    pub fn is_waitlisted(&self) -> bool {
        self.participant_availability < 0
    }

    /// Whether leaders are stuck on a waitlist.
    #[must_use]
    pub fn is_leader_waitlisted(&self) -> bool {
        self.leader_availability < 0
    }
}
