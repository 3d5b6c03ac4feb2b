//! # Listing Fetcher
//!
//! Runs the query behind each listing screen and keeps the last result per
//! screen. The public search composes its predicates from
//! [`FilterCriteria`](crate::filter::FilterCriteria); the personal screens use
//! fixed ownership or favorites predicates for the session user.
//!
//! Results are cached under the screen, the criteria and the user. A new key
//! evicts the old result, and a session change evicts everything.

pub mod error;
pub mod fetcher;
pub mod view;

pub use error::*;
pub use fetcher::ListingFetcher;
pub use view::ListingView;
