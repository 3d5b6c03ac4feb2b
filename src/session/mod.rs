//! # Session Provider
//!
//! Holds the acting user's session and tells interested components when it
//! changes. Components never read a global: the current session is passed to
//! every call as an explicit argument, and the provider only exists so that
//! session-scoped caches can be dropped on sign-in and sign-out.
//!
//! ```rust
//! use estate_discovery::model::Session;
//! use estate_discovery::session::{SessionListener, SessionProvider};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Counter(AtomicUsize);
//!
//! impl SessionListener for Counter {
//!     fn on_session_change(&self, _session: Option<&Session>) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let provider = SessionProvider::new();
//! let counter = Arc::new(Counter::default());
//! provider.subscribe(counter.clone());
//!
//! provider.sign_in(Session::new("u1"));
//! provider.sign_out();
//! assert_eq!(counter.0.load(Ordering::SeqCst), 2);
//! ```

use crate::model::Session;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use tracing::info;

/// Receives session changes. Called synchronously from `sign_in` / `sign_out`,
/// so implementations must not block.
pub trait SessionListener: Send + Sync {
    fn on_session_change(&self, session: Option<&Session>);
}

/// Owner of the current session and of the listener list.
#[derive(Default)]
pub struct SessionProvider {
    current: RwLock<Option<Session>>,
    listeners: Mutex<Vec<Weak<dyn SessionListener>>>,
}

impl SessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the session, or `None` when browsing anonymously.
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers a listener. The provider keeps only a weak reference, so a
    /// dropped listener simply stops being notified.
    pub fn subscribe<L: SessionListener + 'static>(&self, listener: Arc<L>) {
        let listener: Arc<dyn SessionListener> = listener;
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|l| l.strong_count() > 0);
        listeners.push(Arc::downgrade(&listener));
    }

    /// Replaces the session. Listeners hear about it only when the user changes.
    pub fn sign_in(&self, session: Session) {
        let changed = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let changed = current.as_ref().map(|s| &s.user_id) != Some(&session.user_id);
            *current = Some(session.clone());
            changed
        };
        if changed {
            info!(user_id = %session.user_id, "Signed in");
            self.notify(Some(&session));
        }
    }

    /// Ends the session. A no-op when nobody is signed in.
    pub fn sign_out(&self) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            info!(user_id = %previous.user_id, "Signed out");
            self.notify(None);
        }
    }

    fn notify(&self, session: Option<&Session>) {
        let live: Vec<Arc<dyn SessionListener>> = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            listener.on_session_change(session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Option<String>>>);

    impl SessionListener for Recorder {
        fn on_session_change(&self, session: Option<&Session>) {
            self.0
                .lock()
                .unwrap()
                .push(session.map(|s| s.user_id.to_string()));
        }
    }

    #[test]
    fn test_notifies_on_identity_change_only() {
        let provider = SessionProvider::new();
        let recorder = Arc::new(Recorder::default());
        provider.subscribe(recorder.clone());

        provider.sign_in(Session::new("u1"));
        provider.sign_in(Session::new("u1").with_email("u1@example.com"));
        provider.sign_in(Session::new("u2"));
        provider.sign_out();
        provider.sign_out();

        let events = recorder.0.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![Some("u1".to_string()), Some("u2".to_string()), None]
        );
        assert_eq!(provider.current(), None);
    }

    #[test]
    fn test_refreshed_session_is_stored() {
        let provider = SessionProvider::new();
        provider.sign_in(Session::new("u1"));
        provider.sign_in(Session::new("u1").with_email("u1@example.com"));

        let current = provider.current().unwrap();
        assert_eq!(current.email.as_deref(), Some("u1@example.com"));
    }

    #[test]
    fn test_dropped_listener_is_forgotten() {
        let provider = SessionProvider::new();
        let recorder = Arc::new(Recorder::default());
        provider.subscribe(recorder.clone());
        drop(recorder);

        provider.sign_in(Session::new("u1"));
        assert!(provider.listeners.lock().unwrap().is_empty());
    }
}
