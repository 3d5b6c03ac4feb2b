use crate::config::MarketplaceConfig;
use crate::favorites::{FavoriteError, FavoriteManager};
use crate::listing::{ListingFetcher, ListingView};
use crate::model::{FavoriteStatus, NewProperty, PropertyId, Session};
use crate::session::SessionProvider;
use crate::tables;
use record_store::{RecordStore, StoreActor, StoreClient, StoreError};
use std::sync::Arc;
use tracing::{error, info};

/// Starts and stops the marketplace components.
///
/// The store actor runs in its own task. The fetcher and the favorite manager
/// talk to it through a [`StoreClient`] and are subscribed to the session
/// provider, so signing in or out drops their session-scoped state.
///
/// # Example
///
/// ```ignore
/// let system = MarketplaceSystem::new(MarketplaceConfig::from_env());
///
/// system.sessions.sign_in(Session::new("u1"));
/// let session = system.sessions.current();
/// let listings = system.listings.fetch(ListingView::Public, None, session.as_ref()).await?;
/// system.toggle_favorite(session.as_ref(), &listings[0].id).await?;
///
/// system.shutdown().await?;
/// ```
pub struct MarketplaceSystem {
    /// Direct access to the store, for seeding and inspection.
    pub store: StoreClient,

    pub sessions: SessionProvider,

    pub listings: Arc<ListingFetcher>,

    pub favorites: Arc<FavoriteManager>,

    handle: tokio::task::JoinHandle<()>,
}

impl MarketplaceSystem {
    /// Spawns the store actor and wires the components to it.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(config: MarketplaceConfig) -> Self {
        let (actor, store) = StoreActor::new(config.store_buffer, tables::schemas());
        let handle = tokio::spawn(actor.run());

        let shared: Arc<dyn RecordStore> = Arc::new(store.clone());
        let listings = Arc::new(ListingFetcher::new(shared.clone(), &config));
        let favorites = Arc::new(FavoriteManager::new(shared));

        let sessions = SessionProvider::new();
        sessions.subscribe(listings.clone());
        sessions.subscribe(favorites.clone());

        info!(?config, "Marketplace started");
        Self {
            store,
            sessions,
            listings,
            favorites,
            handle,
        }
    }

    /// Inserts a listing and returns its generated id.
    pub async fn add_property(&self, property: NewProperty) -> Result<PropertyId, StoreError> {
        let record = property
            .into_record()
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
        let stored = self.store.insert(tables::PROPERTIES, record).await?;
        match stored.get("id").and_then(|id| id.as_str()) {
            Some(id) => Ok(PropertyId::from(id)),
            None => Err(StoreError::InvalidRecord("stored listing has no id".into())),
        }
    }

    /// Toggles a favorite and, once the store confirmed it, drops the cached
    /// Liked screen so its next fetch shows the change.
    pub async fn toggle_favorite(
        &self,
        session: Option<&Session>,
        property: &PropertyId,
    ) -> Result<FavoriteStatus, FavoriteError> {
        let status = self.favorites.toggle(session, property).await?;
        self.listings.evict(ListingView::Liked);
        Ok(status)
    }

    /// Closes the store's channel and waits for its task.
    ///
    /// Clones of `listings` or `favorites` kept elsewhere hold the channel open,
    /// and so do toggles still running. Returns an error if the actor task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down marketplace...");

        // Every sender must go before the actor sees the channel close.
        drop(self.listings);
        drop(self.favorites);
        drop(self.sessions);
        drop(self.store);

        if let Err(e) = self.handle.await {
            error!("Store task failed: {:?}", e);
            return Err(format!("Store task failed: {:?}", e));
        }

        info!("Marketplace shutdown complete.");
        Ok(())
    }
}
