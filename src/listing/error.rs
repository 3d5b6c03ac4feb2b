//! Error types for the Listing Fetcher.

use record_store::StoreError;
use thiserror::Error;

/// Errors that can occur while fetching listings.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The store query failed, or returned a row that is not a listing.
    #[error("Listing query failed: {0}")]
    RemoteQuery(#[from] StoreError),
}
