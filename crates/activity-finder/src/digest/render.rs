//! HTML rendering of digest content.

use std::fmt::Write;

use crate::listing::Activity;

/// Separator placed between activities in a section.
const ACTIVITY_SEPARATOR: &str = "\n<hr />\n";

/// Render one rule's section: a heading and its activities.
#[must_use]
pub fn render_section(rule_name: &str, activities: &[Activity]) -> String {
    let body = activities
        .iter()
        .map(render_activity)
        .collect::<Vec<_>>()
        .join(ACTIVITY_SEPARATOR);

    format!(
        "<div class=\"rule-section\">\n<h2>{}</h2>\n{body}\n</div>\n",
        html_escape(rule_name)
    )
}

/// Render one activity as a linked title and a details table.
#[must_use]
pub fn render_activity(activity: &Activity) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<div>");
    let _ = writeln!(
        html,
        "<a href=\"{}\">{}</a>",
        html_escape(&activity.link),
        html_escape(&activity.name)
    );
    let _ = writeln!(html, "<table>");

    let end_date = activity
        .end_date
        .map(|d| d.format("%a, %b %d, %y").to_string())
        .unwrap_or_default();
    let rows = [
        ("Difficulty", html_escape(&activity.difficulty)),
        (
            "Start Date",
            activity.start_date.format("%a, %b %d, %y").to_string(),
        ),
        ("End Date", end_date),
        ("Days", activity.number_of_days.to_string()),
        (
            "Availability",
            spots(activity.participant_availability, activity.is_waitlisted()),
        ),
        (
            "Leader Availability",
            spots(activity.leader_availability, activity.is_leader_waitlisted()),
        ),
        (
            "Status",
            format!(
                "{} ({})",
                activity.registration_status,
                html_escape(&activity.registration_info)
            ),
        ),
        ("Branch", html_escape(&activity.branch)),
    ];
    for (label, value) in rows {
        let _ = writeln!(html, "<tr><td>{label}</td><td>{value}</td></tr>");
    }

    let _ = writeln!(html, "</table>");
    let _ = write!(html, "</div>");
    html
}

fn spots(count: i32, waitlisted: bool) -> String {
    if waitlisted {
        format!("{} on waitlist", count.unsigned_abs())
    } else {
        format!("{count} open spots")
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
