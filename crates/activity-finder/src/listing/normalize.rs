//! Conversion from raw listing text into typed activities.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::types::{Activity, RawActivity, RegistrationStatus};
use crate::error::{FinderError, Result};

/// Date layouts seen on the listing pages, most common first.
const DATE_FORMATS: &[&str] = &[
    "%a, %b %d, %Y",
    "%A, %B %d, %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%m/%d/%Y",
    "%Y-%m-%d",
];

/// Normalize a raw listing into an [`Activity`].
pub fn normalize(raw: RawActivity) -> Result<Activity> {
    let start_date = parse_date(&raw.start_date).ok_or_else(|| FinderError::Normalize {
        link: raw.link.clone(),
        reason: format!("unrecognized start date '{}'", raw.start_date),
    })?;

    let end_date = if raw.end_date.trim().is_empty() {
        None
    } else {
        Some(
            parse_date(&raw.end_date).ok_or_else(|| FinderError::Normalize {
                link: raw.link.clone(),
                reason: format!("unrecognized end date '{}'", raw.end_date),
            })?,
        )
    };

    let number_of_days = end_date.map_or(1, |end| (end - start_date).num_days() + 1);

    Ok(Activity {
        participant_availability: parse_availability(&raw.participant_availability),
        leader_availability: parse_availability(&raw.leader_availability),
        registration_status: RegistrationStatus::from_info(&raw.registration_info),
        start_date,
        end_date,
        number_of_days,
        link: raw.link,
        activity_type: raw.activity_type,
        name: raw.name,
        registration_info: raw.registration_info,
        difficulty: raw.difficulty,
        prereqs: raw.prereqs,
        branch: raw.branch,
    })
}

/// Parse a displayed date using the known layouts.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Parse an availability string into a signed count.
///
/// "3 spots" is 3, "2 on waitlist" is -2, and text without a leading count
/// ("Full", "") is 0.
pub fn parse_availability(text: &str) -> i32 {
    static LEADING_DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    let count = LEADING_DIGITS
        .get_or_init(|| Regex::new(r"^\s*(\d+)").ok())
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .unwrap_or(0);

    if text.to_lowercase().contains("waitlist") {
        -count
    } else {
        count
    }
}
