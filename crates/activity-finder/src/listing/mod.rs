//! Activity listing retrieval.
//!
//! Fetches the paginated search results, extracts each entry, and normalizes
//! it into a typed [`Activity`].

mod fetcher;
mod normalize;
mod parser;
mod types;

pub use fetcher::{
    fetch_all_activities, HttpListingSource, ListingSource, ACTIVITIES_PER_PAGE, DEFAULT_BASE_URL,
};
pub use normalize::{normalize, parse_availability, parse_date};
pub use parser::ListingParser;
pub use types::{Activity, RawActivity, RegistrationStatus};
