use crate::favorites::{FavoriteError, PairLocks};
use crate::model::{FavoriteKey, FavoriteState, FavoriteStatus, PropertyId, Session, UserId};
use crate::session::SessionListener;
use crate::tables;
use record_store::{RecordStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Tracks whether each (user, property) pair is a favorite and flips it.
///
/// Cheap to clone; clones share the known states and the pair locks. The known
/// state only ever changes to a value the store has confirmed.
#[derive(Clone)]
pub struct FavoriteManager {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn RecordStore>,
    locks: PairLocks,
    known: Mutex<Known>,
}

/// Confirmed states of the current session. `epoch` moves on every session change.
#[derive(Default)]
struct Known {
    epoch: u64,
    states: HashMap<FavoriteKey, FavoriteStatus>,
}

impl FavoriteManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                locks: PairLocks::new(),
                known: Mutex::default(),
            }),
        }
    }

    /// What is known about the pair without asking the store.
    pub fn known_state(&self, user: &UserId, property: &PropertyId) -> FavoriteState {
        let key = FavoriteKey::new(user.clone(), property.clone());
        self.inner
            .recall(&key)
            .map(FavoriteState::from)
            .unwrap_or_default()
    }

    /// Asks the store whether the pair is a favorite and remembers the answer.
    ///
    /// Waits for any toggle of the same pair to finish first.
    #[instrument(skip(self, user, property), fields(user = %user, property = %property))]
    pub async fn check_status(
        &self,
        user: &UserId,
        property: &PropertyId,
    ) -> Result<FavoriteStatus, FavoriteError> {
        let key = FavoriteKey::new(user.clone(), property.clone());
        let epoch = self.inner.epoch();
        let _guard = self.inner.locks.acquire(&key).await;
        let status = self
            .inner
            .read_status(&key)
            .await
            .map_err(FavoriteError::RemoteQuery)?;
        self.inner.remember(&key, status, epoch);
        Ok(status)
    }

    /// Likes the property if it is not liked, unlikes it otherwise, and returns
    /// the confirmed new status.
    ///
    /// Toggles of one pair apply in the order they were issued. Once this call
    /// holds the pair's lock the update finishes even if the caller stops waiting.
    #[instrument(skip(self, session, property), fields(property = %property))]
    pub async fn toggle(
        &self,
        session: Option<&Session>,
        property: &PropertyId,
    ) -> Result<FavoriteStatus, FavoriteError> {
        let Some(session) = session else {
            warn!("Favorite toggle rejected: not signed in");
            return Err(FavoriteError::Unauthenticated);
        };
        let key = FavoriteKey::new(session.user_id.clone(), property.clone());

        let epoch = self.inner.epoch();
        let guard = self.inner.locks.acquire(&key).await;
        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            inner.flip(key, epoch).await
        });

        task.await
            .map_err(|e| FavoriteError::RemoteMutation(StoreError::Backend(Box::new(e))))?
    }
}

impl Inner {
    fn known(&self) -> std::sync::MutexGuard<'_, Known> {
        self.known.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn epoch(&self) -> u64 {
        self.known().epoch
    }

    fn recall(&self, key: &FavoriteKey) -> Option<FavoriteStatus> {
        self.known().states.get(key).copied()
    }

    /// Records a confirmed state unless the session changed since `epoch`.
    fn remember(&self, key: &FavoriteKey, status: FavoriteStatus, epoch: u64) {
        let mut known = self.known();
        if known.epoch != epoch {
            debug!(%key, "Session changed, not keeping state");
            return;
        }
        known.states.insert(key.clone(), status);
    }

    async fn read_status(&self, key: &FavoriteKey) -> Result<FavoriteStatus, StoreError> {
        let exists = self
            .store
            .exists(tables::LIKED_PROPERTIES, key.predicates())
            .await?;
        Ok(FavoriteStatus::from_exists(exists))
    }

    /// Caller holds the pair lock. `epoch` is the session the toggle was issued in.
    async fn flip(&self, key: FavoriteKey, epoch: u64) -> Result<FavoriteStatus, FavoriteError> {
        let current = match self.recall(&key) {
            Some(status) => status,
            None => {
                let status = self
                    .read_status(&key)
                    .await
                    .map_err(FavoriteError::RemoteQuery)?;
                self.remember(&key, status, epoch);
                status
            }
        };

        let next = match current {
            FavoriteStatus::Liked => {
                match self
                    .store
                    .delete(tables::LIKED_PROPERTIES, key.predicates())
                    .await
                {
                    Ok(0) => debug!(%key, "Relation already gone"),
                    Ok(_) => {}
                    Err(e) => {
                        warn!(%key, error = %e, "Unlike failed");
                        return Err(FavoriteError::RemoteMutation(e));
                    }
                }
                FavoriteStatus::NotLiked
            }
            FavoriteStatus::NotLiked => {
                match self
                    .store
                    .insert(tables::LIKED_PROPERTIES, key.to_record())
                    .await
                {
                    Ok(_) => {}
                    Err(e) if e.is_duplicate() => debug!(%key, "Relation already present"),
                    Err(e) => {
                        warn!(%key, error = %e, "Like failed");
                        return Err(FavoriteError::RemoteMutation(e));
                    }
                }
                FavoriteStatus::Liked
            }
        };

        self.remember(&key, next, epoch);
        info!(%key, status = ?next, "Favorite toggled");
        Ok(next)
    }
}

impl SessionListener for FavoriteManager {
    /// Forgets every known state, including outcomes of toggles still running;
    /// the next reads go back to the store.
    fn on_session_change(&self, _session: Option<&Session>) {
        let mut known = self.inner.known();
        known.epoch += 1;
        if !known.states.is_empty() {
            info!(pairs = known.states.len(), "Favorite states cleared");
        }
        known.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_store::mock::{MockStore, Received};
    use record_store::Record;
    use serde_json::json;

    fn relation() -> Record {
        json!({ "id": "r1", "user_id": "u1", "property_id": "p1" })
            .as_object()
            .cloned()
            .unwrap()
    }

    fn manager(mock: &MockStore) -> FavoriteManager {
        FavoriteManager::new(Arc::new(mock.client()))
    }

    #[tokio::test]
    async fn test_unauthenticated_toggle_sends_nothing() {
        let mock = MockStore::new();
        let favorites = manager(&mock);

        let result = favorites.toggle(None, &PropertyId::from("p1")).await;

        assert!(matches!(result, Err(FavoriteError::Unauthenticated)));
        assert!(mock.received().is_empty());
        mock.verify();
    }

    #[tokio::test]
    async fn test_first_like_inserts_the_pair() {
        let mut mock = MockStore::new();
        mock.expect_query().return_ok(Vec::new());
        mock.expect_insert().return_ok(relation());
        let favorites = manager(&mock);
        let session = Session::new("u1");
        let (user, property) = (UserId::from("u1"), PropertyId::from("p1"));
        assert_eq!(favorites.known_state(&user, &property), FavoriteState::Unknown);

        let status = favorites.toggle(Some(&session), &property).await.unwrap();

        assert_eq!(status, FavoriteStatus::Liked);
        assert_eq!(favorites.known_state(&user, &property), FavoriteState::Liked);
        match &mock.received()[1] {
            Received::Insert { table, record } => {
                assert_eq!(table, "liked_properties");
                assert_eq!(record["user_id"], "u1");
                assert_eq!(record["property_id"], "p1");
            }
            other => panic!("expected an insert, got {other:?}"),
        }
        mock.verify();
    }

    #[tokio::test]
    async fn test_two_toggles_return_to_not_liked() {
        let mut mock = MockStore::new();
        mock.expect_query().return_ok(Vec::new());
        mock.expect_insert().return_ok(relation());
        mock.expect_delete().return_ok(1);
        let favorites = manager(&mock);
        let session = Session::new("u1");
        let property = PropertyId::from("p1");

        assert!(favorites.toggle(Some(&session), &property).await.unwrap().is_liked());
        let back = favorites.toggle(Some(&session), &property).await.unwrap();

        assert_eq!(back, FavoriteStatus::NotLiked);
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_insert_keeps_previous_state() {
        let mut mock = MockStore::new();
        mock.expect_query().return_ok(Vec::new());
        mock.expect_insert().return_err(StoreError::Backend("timeout".into()));
        mock.expect_insert().return_ok(relation());
        let favorites = manager(&mock);
        let session = Session::new("u1");
        let (user, property) = (UserId::from("u1"), PropertyId::from("p1"));

        let failed = favorites.toggle(Some(&session), &property).await;
        assert!(matches!(failed, Err(FavoriteError::RemoteMutation(_))));
        assert_eq!(favorites.known_state(&user, &property), FavoriteState::NotLiked);

        // The state read is not repeated: the retry goes straight to the insert.
        let retried = favorites.toggle(Some(&session), &property).await.unwrap();
        assert_eq!(retried, FavoriteStatus::Liked);
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_liked() {
        let mut mock = MockStore::new();
        mock.expect_query().return_ok(vec![relation()]);
        mock.expect_delete().return_err(StoreError::StoreClosed);
        let favorites = manager(&mock);
        let (user, property) = (UserId::from("u1"), PropertyId::from("p1"));

        let failed = favorites.toggle(Some(&Session::new("u1")), &property).await;

        assert!(matches!(failed, Err(FavoriteError::RemoteMutation(StoreError::StoreClosed))));
        assert_eq!(favorites.known_state(&user, &property), FavoriteState::Liked);
        mock.verify();
    }

    #[tokio::test]
    async fn test_duplicate_insert_counts_as_liked() {
        let mut mock = MockStore::new();
        mock.expect_query().return_ok(Vec::new());
        mock.expect_insert().return_err(StoreError::Duplicate {
            table: "liked_properties".into(),
            key: "user_id=u1, property_id=p1".into(),
        });
        let favorites = manager(&mock);

        let status = favorites
            .toggle(Some(&Session::new("u1")), &PropertyId::from("p1"))
            .await
            .unwrap();

        assert_eq!(status, FavoriteStatus::Liked);
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_state_read_is_a_query_error() {
        let mut mock = MockStore::new();
        mock.expect_query().return_err(StoreError::Backend("offline".into()));
        let favorites = manager(&mock);
        let (user, property) = (UserId::from("u1"), PropertyId::from("p1"));

        let failed = favorites.toggle(Some(&Session::new("u1")), &property).await;

        assert!(matches!(failed, Err(FavoriteError::RemoteQuery(_))));
        assert_eq!(favorites.known_state(&user, &property), FavoriteState::Unknown);
        mock.verify();
    }

    #[tokio::test]
    async fn test_check_status_is_repeatable() {
        let mut mock = MockStore::new();
        mock.expect_query().return_ok(vec![relation()]);
        mock.expect_query().return_ok(vec![relation()]);
        let favorites = manager(&mock);
        let (user, property) = (UserId::from("u1"), PropertyId::from("p1"));

        let first = favorites.check_status(&user, &property).await.unwrap();
        let second = favorites.check_status(&user, &property).await.unwrap();

        assert_eq!(first, FavoriteStatus::Liked);
        assert_eq!(first, second);
        mock.verify();
    }

    #[tokio::test]
    async fn test_session_change_forgets_states() {
        let mut mock = MockStore::new();
        mock.expect_query().return_ok(Vec::new());
        let favorites = manager(&mock);
        let (user, property) = (UserId::from("u1"), PropertyId::from("p1"));

        favorites.check_status(&user, &property).await.unwrap();
        assert_eq!(favorites.known_state(&user, &property), FavoriteState::NotLiked);

        favorites.on_session_change(None);
        assert_eq!(favorites.known_state(&user, &property), FavoriteState::Unknown);
        mock.verify();
    }
}
