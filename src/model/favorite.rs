//! The favorite relation between a user and a property.

use crate::model::{PropertyId, UserId};
use record_store::{Predicate, Record};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifies one (user, property) pair. At most one relation row exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FavoriteKey {
    pub user_id: UserId,
    pub property_id: PropertyId,
}

impl FavoriteKey {
    pub fn new(user_id: UserId, property_id: PropertyId) -> Self {
        Self {
            user_id,
            property_id,
        }
    }

    /// Predicates selecting exactly this pair's relation row.
    pub fn predicates(&self) -> Vec<Predicate> {
        vec![
            Predicate::eq("user_id", self.user_id.0.clone()),
            Predicate::eq("property_id", self.property_id.0.clone()),
        ]
    }

    /// The relation row to insert for this pair.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("user_id".into(), self.user_id.0.clone().into());
        record.insert("property_id".into(), self.property_id.0.clone().into());
        record
    }
}

impl Display for FavoriteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.user_id, self.property_id)
    }
}

/// Whether the relation exists, as confirmed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FavoriteStatus {
    Liked,
    NotLiked,
}

impl FavoriteStatus {
    pub fn from_exists(exists: bool) -> Self {
        if exists {
            FavoriteStatus::Liked
        } else {
            FavoriteStatus::NotLiked
        }
    }

    pub fn is_liked(self) -> bool {
        self == FavoriteStatus::Liked
    }
}

/// What the client currently knows about a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FavoriteState {
    /// Never checked in this session, or forgotten after a session change.
    #[default]
    Unknown,
    Liked,
    NotLiked,
}

impl From<FavoriteStatus> for FavoriteState {
    fn from(status: FavoriteStatus) -> Self {
        match status {
            FavoriteStatus::Liked => FavoriteState::Liked,
            FavoriteStatus::NotLiked => FavoriteState::NotLiked,
        }
    }
}
