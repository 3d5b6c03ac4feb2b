//! Represents a listing in the marketplace.
//!
//! Rows of the `properties` table decode into [`Property`]; [`NewProperty`] is the
//! payload used to add one. The discovery code only ever reads properties.
use chrono::{DateTime, Utc};
use record_store::Record;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Shown when a listing has no images.
pub const PLACEHOLDER_IMAGE: &str = "https://images.unsplash.com/photo-1564013799919-ab600027ffc6";

/// Type-safe identifier for Properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl From<&str> for PropertyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PropertyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type-safe identifier for Users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Commercial,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Commercial,
        PropertyType::Land,
    ];

    /// Column value used by the `properties` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Commercial => "commercial",
            PropertyType::Land => "land",
        }
    }
}

impl Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("Unknown property type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Unavailable,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub price: f64,
    pub location: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub size: f64,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: String,
    pub status: PropertyStatus,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Price as shown on cards and detail pages, e.g. `₹25,00,000`.
    pub fn display_price(&self) -> String {
        format_inr(self.price)
    }

    pub fn cover_image(&self) -> &str {
        self.images
            .first()
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// The images to page through; never empty.
    pub fn gallery(&self) -> Vec<&str> {
        if self.images.is_empty() {
            vec![PLACEHOLDER_IMAGE]
        } else {
            self.images.iter().map(String::as_str).collect()
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == PropertyStatus::Available
    }
}

/// Formats an amount as whole rupees with Indian digit grouping.
///
/// Rounds half away from zero, so every view of the same price agrees.
pub fn format_inr(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", amount.abs().round());

    if digits.len() <= 3 {
        return format!("{sign}₹{digits}");
    }
    let (head, last_three) = digits.split_at(digits.len() - 3);
    // Lakh/crore grouping: pairs of digits to the left of the last three.
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{sign}₹{},{last_three}", groups.join(","))
}

/// Payload for adding a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub price: f64,
    pub location: String,
    pub city: String,
    pub state: String,
    pub size: f64,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub images: Vec<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub status: PropertyStatus,
}

impl NewProperty {
    /// Splits a comma-separated list of image URLs, dropping blanks.
    pub fn parse_images(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The row to hand to the store. `id` and `created_at` are left to the store.
    pub fn into_record(self) -> Result<Record, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            // Structs always serialize to objects.
            other => Err(serde::ser::Error::custom(format!(
                "expected an object, got {other}"
            ))),
        }
    }
}
