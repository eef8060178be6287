//! Persisted login session.

use super::{KeyValueStore, StoreError};
use crate::model::Session;

const SESSION_KEY: &str = "session";

/// Typed access to the session entry of a [`KeyValueStore`].
pub struct SessionStore<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> SessionStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The stored session; a corrupt entry is dropped and reported as absent.
    pub fn load(&self) -> Result<Option<Session>, StoreError> {
        let Some(raw) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Discarding unreadable session entry: {}", e);
                self.store.clear(SESSION_KEY)?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.store.set(SESSION_KEY, &serde_json::to_string(session)?)
    }

    /// Log out.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.clear(SESSION_KEY)
    }
}
