//! # Favorite State Manager
//!
//! Per (user, property) pair the manager moves from `Unknown` to `Liked` or
//! `NotLiked`, and only ever to a state the store has confirmed. Toggles of the
//! same pair are serialized through [`PairLocks`], so a second click waits for
//! the first and then sees its outcome.
//!
//! The relation table has no transactions, so the only guard against duplicate
//! rows is the pair lock in this process plus the table's unique constraint;
//! a duplicate rejection is treated as a successful like.

pub mod error;
pub mod manager;
pub mod registry;

pub use error::*;
pub use manager::FavoriteManager;
pub use registry::PairLocks;
