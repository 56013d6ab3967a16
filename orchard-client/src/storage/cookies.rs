use std::sync::Arc;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StorageError, get_json, set_json};
use crate::clock::Clock;

#[derive(Debug, Serialize, Deserialize)]
struct StoredCookie {
    value: String,
    /// Milliseconds since the Unix epoch
    expires_at: i64,
}

/// Named values with an absolute expiry.
///
/// Expired cookies read as absent and are pruned on read.
#[derive(Clone, Debug)]
pub struct CookieJar {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl CookieJar {
    /// Jar over `store`, expiring against `clock`
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Live cookie value
    pub fn get(&self, name: &str) -> Option<String> {
        let cookie: StoredCookie = get_json(self.store.as_ref(), name)?;
        if cookie.expires_at <= self.clock.now_millis() {
            if let Err(e) = self.store.remove(name) {
                warn!("[CookieJar] Failed to prune expired cookie '{}': {}", name, e);
            }
            return None;
        }
        Some(cookie.value)
    }

    /// Store `value` under `name`, expiring `max_age` from now
    pub fn set(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StorageError> {
        let max_age = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let cookie = StoredCookie {
            value: value.to_string(),
            expires_at: self.clock.now_millis().saturating_add(max_age),
        };
        set_json(self.store.as_ref(), name, &cookie)
    }

    /// Delete a cookie
    pub fn remove(&self, name: &str) -> Result<(), StorageError> {
        self.store.remove(name)
    }

    /// Absolute expiry of a live cookie
    pub fn expires_at(&self, name: &str) -> Option<i64> {
        let cookie: StoredCookie = get_json(self.store.as_ref(), name)?;
        (cookie.expires_at > self.clock.now_millis()).then_some(cookie.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    fn jar() -> (CookieJar, ManualClock, MemoryStore) {
        let clock = ManualClock::new(1_000_000);
        let store = MemoryStore::new();
        let jar = CookieJar::new(Arc::new(store.clone()), Arc::new(clock.clone()));
        (jar, clock, store)
    }

    #[test]
    fn cookie_is_readable_until_max_age_elapses() {
        let (jar, clock, store) = jar();
        jar.set("refresh_token", "r1", Duration::from_secs(60)).unwrap();
        assert_eq!(jar.expires_at("refresh_token"), Some(1_060_000));

        clock.advance(Duration::from_millis(59_999));
        assert_eq!(jar.get("refresh_token").as_deref(), Some("r1"));

        clock.advance(Duration::from_millis(1));
        assert_eq!(jar.get("refresh_token"), None);
        assert!(store.is_empty(), "expired cookie should be pruned");
    }

    #[test]
    fn set_overwrites_value_and_resets_expiry() {
        let (jar, clock, _) = jar();
        jar.set("refresh_token", "old", Duration::from_secs(10)).unwrap();
        clock.advance(Duration::from_secs(9));
        jar.set("refresh_token", "new", Duration::from_secs(10)).unwrap();
        clock.advance(Duration::from_secs(5));
        assert_eq!(jar.get("refresh_token").as_deref(), Some("new"));
    }
}
