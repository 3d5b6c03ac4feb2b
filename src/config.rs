//! Runtime configuration of the marketplace system.

use serde::Deserialize;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

/// Tunables for [`MarketplaceSystem`](crate::lifecycle::MarketplaceSystem).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Capacity of the store actor's request channel. Zero is treated as one.
    pub store_buffer: usize,
    /// How many listings the landing-page strip shows.
    pub featured_limit: usize,
    /// When false every fetch goes to the store.
    pub cache_listings: bool,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            store_buffer: 32,
            featured_limit: 6,
            cache_listings: true,
        }
    }
}

impl MarketplaceConfig {
    /// Defaults overlaid with `ESTATE_STORE_BUFFER`, `ESTATE_FEATURED_LIMIT` and
    /// `ESTATE_CACHE_LISTINGS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        overlay(&lookup, "ESTATE_STORE_BUFFER", &mut config.store_buffer);
        overlay(&lookup, "ESTATE_FEATURED_LIMIT", &mut config.featured_limit);
        overlay(&lookup, "ESTATE_CACHE_LISTINGS", &mut config.cache_listings);
        config
    }
}

fn overlay<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, slot: &mut T)
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(name) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(e) => warn!(variable = name, value = %raw, error = %e, "Ignoring invalid setting"),
    }
}
