use crate::config::MarketplaceConfig;
use crate::filter::{compose, FilterCriteria, PredicateSet};
use crate::listing::{ListingError, ListingView};
use crate::model::{Property, PropertyId, Session, UserId};
use crate::session::SessionListener;
use crate::tables;
use record_store::{Predicate, Query, Record, RecordStore, StoreError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument};

/// What a cached result was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListingKey {
    criteria: FilterCriteria,
    user: Option<UserId>,
}

impl ListingKey {
    fn new(view: ListingView, criteria: Option<&FilterCriteria>, user: Option<&UserId>) -> Self {
        let criteria = if view.uses_criteria() {
            criteria.cloned().unwrap_or_default()
        } else {
            FilterCriteria::default()
        };
        Self {
            criteria,
            user: user.cloned(),
        }
    }
}

/// Session epoch and per-view generation a fetch started under.
type Stamp = (u64, u64);

#[derive(Default)]
struct CacheState {
    /// Bumped by `invalidate`.
    epoch: u64,
    /// Bumped by `evict`.
    generations: HashMap<ListingView, u64>,
    entries: HashMap<ListingView, (ListingKey, Vec<Property>)>,
}

impl CacheState {
    fn stamp(&self, view: ListingView) -> Stamp {
        (self.epoch, self.generations.get(&view).copied().unwrap_or(0))
    }
}

/// Runs listing queries and remembers the last result of each view.
///
/// Each view has one cache slot. A fetch with the same key as the slot is served
/// from memory; a fetch with a different key empties the slot before going to the
/// store. Every slot is dropped when the session changes and a single slot can be
/// evicted; a fetch that started before either keeps its result to itself.
pub struct ListingFetcher {
    store: Arc<dyn RecordStore>,
    featured_limit: usize,
    cache_enabled: bool,
    cache: Mutex<CacheState>,
}

impl ListingFetcher {
    pub fn new(store: Arc<dyn RecordStore>, config: &MarketplaceConfig) -> Self {
        Self {
            store,
            featured_limit: config.featured_limit,
            cache_enabled: config.cache_listings,
            cache: Mutex::default(),
        }
    }

    /// Listings for `view`. `criteria` only matters for [`ListingView::Public`];
    /// the session selects the user for the personal views.
    ///
    /// Without a session the personal views are empty and the store is not asked.
    #[instrument(skip(self, view, criteria, session), fields(view = %view))]
    pub async fn fetch(
        &self,
        view: ListingView,
        criteria: Option<&FilterCriteria>,
        session: Option<&Session>,
    ) -> Result<Vec<Property>, ListingError> {
        let user = session.map(|s| &s.user_id);
        let owner = match (view.requires_session(), user) {
            (true, None) => {
                debug!("No session, nothing to show");
                return Ok(Vec::new());
            }
            (_, owner) => owner,
        };

        let key = ListingKey::new(view, criteria, user);
        let stamp = match self.cached(view, &key) {
            Ok(hit) => {
                debug!(count = hit.len(), "Cache hit");
                return Ok(hit);
            }
            Err(stamp) => stamp,
        };
        debug!(criteria = ?key.criteria, "Cache miss");

        let properties = match (view, owner) {
            (ListingView::Public, _) => self.run(compose(&key.criteria)).await?,
            (ListingView::Featured, _) => self.run(PredicateSet::featured(self.featured_limit)).await?,
            (ListingView::MyListings, Some(owner)) => self.run(PredicateSet::owned_by(owner)).await?,
            (ListingView::Liked, Some(owner)) => self.liked_by(owner).await?,
            // requires_session() returned above for these without a user
            (ListingView::MyListings | ListingView::Liked, None) => Vec::new(),
        };

        self.remember(view, key, stamp, &properties);
        Ok(properties)
    }

    /// The detail-page lookup. Never cached.
    #[instrument(skip(self))]
    pub async fn fetch_property(&self, id: &PropertyId) -> Result<Option<Property>, ListingError> {
        let rows = self
            .store
            .query(
                Query::table(tables::PROPERTIES)
                    .filter(Predicate::eq("id", id.0.clone()))
                    .limit(1),
            )
            .await?;
        Ok(rows.into_iter().next().map(decode).transpose()?)
    }

    /// Drops every cached result and disowns fetches still in flight.
    pub fn invalidate(&self) {
        let mut cache = self.lock_cache();
        cache.epoch += 1;
        if !cache.entries.is_empty() {
            info!(views = cache.entries.len(), "Listing cache invalidated");
        }
        cache.entries.clear();
    }

    /// Drops the cached result of one view and disowns its fetches in flight.
    pub fn evict(&self, view: ListingView) {
        let mut cache = self.lock_cache();
        *cache.generations.entry(view).or_default() += 1;
        if cache.entries.remove(&view).is_some() {
            debug!(view = %view, "Listing cache entry evicted");
        }
    }

    /// The cached result for `key`, or the stamp to store a fresh one under.
    fn cached(&self, view: ListingView, key: &ListingKey) -> Result<Vec<Property>, Stamp> {
        let mut cache = self.lock_cache();
        let stamp = cache.stamp(view);
        if !self.cache_enabled {
            return Err(stamp);
        }
        match cache.entries.get(&view) {
            Some((cached_key, properties)) if cached_key == key => Ok(properties.clone()),
            Some(_) => {
                cache.entries.remove(&view);
                Err(stamp)
            }
            None => Err(stamp),
        }
    }

    fn remember(&self, view: ListingView, key: ListingKey, stamp: Stamp, properties: &[Property]) {
        if !self.cache_enabled {
            return;
        }
        let mut cache = self.lock_cache();
        if cache.stamp(view) != stamp {
            debug!("Discarding result fetched before invalidation");
            return;
        }
        cache.entries.insert(view, (key, properties.to_vec()));
    }

    fn lock_cache(&self) -> MutexGuard<'_, CacheState> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, set: PredicateSet) -> Result<Vec<Property>, StoreError> {
        let rows = self.store.query(set.into_query(tables::PROPERTIES)).await?;
        rows.into_iter().map(decode).collect()
    }

    /// Favorites take two calls: the relation rows, then the listings they name.
    async fn liked_by(&self, user: &UserId) -> Result<Vec<Property>, StoreError> {
        let relations = self
            .store
            .query(
                Query::table(tables::LIKED_PROPERTIES)
                    .filter(Predicate::eq("user_id", user.0.clone())),
            )
            .await?;

        let ids = relations
            .iter()
            .map(|row| match row.get("property_id") {
                Some(Value::String(id)) => Ok(PropertyId::from(id.as_str())),
                _ => Err(StoreError::InvalidRecord(format!(
                    "{} row without property_id",
                    tables::LIKED_PROPERTIES
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.run(PredicateSet::member_of(&ids)).await
    }
}

impl SessionListener for ListingFetcher {
    fn on_session_change(&self, _session: Option<&Session>) {
        self.invalidate();
    }
}

fn decode(row: Record) -> Result<Property, StoreError> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| StoreError::InvalidRecord(format!("not a property: {e}")))
}
