//! Activity listing HTML parser.

use scraper::{ElementRef, Html, Selector};

use super::types::RawActivity;
use crate::error::{FinderError, Result};

/// Container of one activity in the search results.
const ITEM_SELECTOR: &str = ".result-item.contenttype-mtneers-activity";

/// Parser for activity search result pages.
pub struct ListingParser;

impl ListingParser {
    /// Parse every listing on a results page.
    ///
    /// An empty vector means the page had no results, which is how the
    /// fetcher knows it ran past the last page.
    pub fn parse(html: &str) -> Result<Vec<RawActivity>> {
        let document = Html::parse_document(html);
        let item_selector = selector(ITEM_SELECTOR)?;
        let fields = FieldSelectors::new()?;

        let mut activities = Vec::new();
        for item in document.select(&item_selector) {
            activities.push(Self::parse_item(item, &fields)?);
        }

        tracing::debug!(count = activities.len(), "Parsed listings from page");
        Ok(activities)
    }

    fn parse_item(item: ElementRef<'_>, fields: &FieldSelectors) -> Result<RawActivity> {
        let title_link = item
            .select(&fields.title_link)
            .next()
            .ok_or_else(|| FinderError::Parse("listing is missing its title link".to_string()))?;

        let link = title_link
            .value()
            .attr("href")
            .ok_or_else(|| FinderError::Parse("title link has no href".to_string()))?
            .to_string();

        let title = joined_text(title_link);
        let (activity_type, name) = match title.split_once('-') {
            Some((kind, name)) => (kind.trim().to_string(), name.trim().to_string()),
            None => (String::new(), title.clone()),
        };

        let date = item
            .select(&fields.date)
            .next()
            .map(joined_text)
            .ok_or_else(|| FinderError::Parse(format!("listing {link} is missing its date")))?;
        let (start_date, end_date) = match date.split_once('-') {
            Some((start, end)) => (start.trim().to_string(), end.trim().to_string()),
            None => (date.trim().to_string(), String::new()),
        };

        let mut spans = item.select(&fields.availability_span);
        let participant_availability = spans.next().map(joined_text).unwrap_or_default();
        let leader_availability = spans.next().map(joined_text).unwrap_or_default();

        let registration_info = item
            .select(&fields.registration)
            .next()
            .map(joined_text)
            .unwrap_or_default();

        let difficulty = item
            .select(&fields.difficulty)
            .next()
            .map(|el| strip_label(&joined_text(el), "Difficulty:"))
            .unwrap_or_default();

        let prereqs = item
            .select(&fields.prereqs)
            .next()
            .map(|el| strip_label(&joined_text(el), "Prerequisites:"))
            .unwrap_or_default();

        let branch = item
            .select(&fields.branch)
            .next()
            .map(|el| {
                let text = joined_text(el);
                text.strip_suffix("Branch")
                    .map_or_else(|| text.clone(), |s| s.trim_end().to_string())
            })
            .unwrap_or_default();

        Ok(RawActivity {
            link,
            activity_type,
            name,
            start_date,
            end_date,
            participant_availability,
            leader_availability,
            registration_info,
            difficulty,
            prereqs,
            branch,
        })
    }
}

/// Selectors for the fields inside one result item.
struct FieldSelectors {
    title_link: Selector,
    date: Selector,
    availability_span: Selector,
    registration: Selector,
    difficulty: Selector,
    prereqs: Selector,
    branch: Selector,
}

impl FieldSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            title_link: selector(".result-title a")?,
            date: selector(".result-date")?,
            availability_span: selector(".result-availability span")?,
            registration: selector(".result-reg")?,
            difficulty: selector(".result-difficulty")?,
            prereqs: selector(".result-prereqs")?,
            branch: selector(".result-branch")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| FinderError::Parse(format!("invalid selector {css}: {e}")))
}

/// Text nodes of an element, trimmed and joined by single spaces.
fn joined_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_label(text: &str, label: &str) -> String {
    text.strip_prefix(label).unwrap_or(text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<div class="result-item contenttype-mtneers-activity">
  <h3 class="result-title"><a href="https://www.mountaineers.org/activities/climb-1">Basic Alpine Climb - Mount Baker</a></h3>
  <div class="result-date">Sat, Jun 1, 2024 - Sun, Jun 2, 2024</div>
  <div class="result-availability">
    <span><b>3</b> participant spots</span>
    <span>1 on waitlist</span>
  </div>
  <div class="result-reg">Registration closes Thu, May 30</div>
  <div class="result-difficulty">Difficulty: Moderate</div>
  <div class="result-prereqs">Prerequisites: Basic Climbing Course</div>
  <div class="result-branch">Seattle Branch</div>
</div>
<div class="result-item contenttype-mtneers-activity">
  <h3 class="result-title"><a href="https://www.mountaineers.org/activities/kayak-2">Sea Kayak - Lake Union Paddle</a></h3>
  <div class="result-date">Wed, Jun 5, 2024</div>
  <div class="result-availability"><span>Full</span></div>
  <div class="result-reg">Registration closed</div>
</div>
<div class="result-item contenttype-mtneers-course">
  <h3 class="result-title"><a href="/courses/basic">Basic Climbing Course</a></h3>
</div>
</body></html>
"#;

    #[test]
    fn test_parse_full_listing() {
        let activities = ListingParser::parse(PAGE).unwrap();
        assert_eq!(activities.len(), 2);

        let climb = &activities[0];
        assert_eq!(
            climb.link,
            "https://www.mountaineers.org/activities/climb-1"
        );
        assert_eq!(climb.activity_type, "Basic Alpine Climb");
        assert_eq!(climb.name, "Mount Baker");
        assert_eq!(climb.start_date, "Sat, Jun 1, 2024");
        assert_eq!(climb.end_date, "Sun, Jun 2, 2024");
        assert_eq!(climb.participant_availability, "3 participant spots");
        assert_eq!(climb.leader_availability, "1 on waitlist");
        assert_eq!(climb.registration_info, "Registration closes Thu, May 30");
        assert_eq!(climb.difficulty, "Moderate");
        assert_eq!(climb.prereqs, "Basic Climbing Course");
        assert_eq!(climb.branch, "Seattle");
    }

    #[test]
    fn test_parse_sparse_listing() {
        let activities = ListingParser::parse(PAGE).unwrap();
        let kayak = &activities[1];

        assert_eq!(kayak.activity_type, "Sea Kayak");
        assert_eq!(kayak.end_date, "");
        assert_eq!(kayak.participant_availability, "Full");
        assert_eq!(kayak.leader_availability, "");
        assert_eq!(kayak.difficulty, "");
        assert_eq!(kayak.prereqs, "");
        assert_eq!(kayak.branch, "");
    }

    #[test]
    fn test_parse_empty_page() {
        let activities = ListingParser::parse("<html><body><p>No results</p></body></html>").unwrap();
        assert!(activities.is_empty());
    }

    #[test]
    fn test_missing_title_is_error() {
        let html = r#"<div class="result-item contenttype-mtneers-activity">
            <div class="result-date">Sat, Jun 1, 2024</div></div>"#;
        assert!(matches!(
            ListingParser::parse(html),
            Err(FinderError::Parse(_))
        ));
    }
}
