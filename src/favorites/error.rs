//! Error types for the Favorite State Manager.

use record_store::StoreError;
use thiserror::Error;

/// Errors that can occur while reading or toggling a favorite.
///
/// Every failure leaves the known state of the pair as it was before the call.
#[derive(Debug, Error)]
pub enum FavoriteError {
    /// A toggle was attempted without a session. Nothing was sent to the store.
    #[error("Sign in to save favorites")]
    Unauthenticated,

    /// The existence check against the relation table failed.
    #[error("Favorite lookup failed: {0}")]
    RemoteQuery(#[source] StoreError),

    /// The insert or delete of the relation row failed.
    #[error("Favorite update failed: {0}")]
    RemoteMutation(#[source] StoreError),
}
