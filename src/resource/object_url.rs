//! In-memory registry of `blob:` URLs for encoded output.
//!
//! Every composite result is registered here and can be handed out as a URL,
//! resolved back to its bytes (including by the resource loader, so an output
//! can feed another composite) and revoked when no longer needed.
//!
//! Entries hold the full encoded output. An unbounded store keeps every one
//! until it is revoked; a store built with [`ObjectUrlStore::with_capacity`]
//! drops the oldest entry once the limit is reached.

use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

/// Scheme and authority shared by every URL this store hands out.
pub const OBJECT_URL_PREFIX: &str = "blob:canvas-watermark/";

/// Bytes registered under an object URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub mime_type: String,
}

#[derive(Debug, Default)]
struct Entries {
    objects: HashMap<String, StoredObject>,
    /// Registration order, oldest first.
    order: VecDeque<String>,
}

/// Thread-safe object URL registry. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlStore {
    entries: Arc<RwLock<Entries>>,
    capacity: Option<usize>,
}

impl ObjectUrlStore {
    /// Store that keeps entries until they are revoked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that keeps at most `capacity` entries, evicting the oldest.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::default(),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Register `bytes` and return a fresh URL for them.
    pub fn create(&self, bytes: Bytes, mime_type: impl Into<String>) -> String {
        let url = format!("{OBJECT_URL_PREFIX}{}", Uuid::new_v4());
        let object = StoredObject {
            bytes,
            mime_type: mime_type.into(),
        };

        let mut entries = self.entries.write();
        if let Some(capacity) = self.capacity {
            while entries.objects.len() >= capacity {
                let Some(oldest) = entries.order.pop_front() else {
                    break;
                };
                entries.objects.remove(&oldest);
                tracing::debug!(url = %oldest, capacity, "Evicted object URL");
            }
        }
        entries.objects.insert(url.clone(), object);
        entries.order.push_back(url.clone());
        drop(entries);

        tracing::debug!(url = %url, "Registered object URL");
        url
    }

    pub fn get(&self, url: &str) -> Option<StoredObject> {
        self.entries.read().objects.get(url).cloned()
    }

    /// Drop a registered URL. Returns false when it was not registered.
    pub fn revoke(&self, url: &str) -> bool {
        let mut entries = self.entries.write();
        if entries.objects.remove(url).is_none() {
            return false;
        }
        entries.order.retain(|registered| registered != url);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.read().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().objects.is_empty()
    }

    /// Total encoded bytes currently held.
    pub fn retained_bytes(&self) -> usize {
        self.entries
            .read()
            .objects
            .values()
            .map(|object| object.bytes.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_resolve() {
        let store = ObjectUrlStore::new();
        let url = store.create(Bytes::from_static(b"abc"), "image/png");

        assert!(url.starts_with(OBJECT_URL_PREFIX));
        let object = store.get(&url).unwrap();
        assert_eq!(object.bytes, Bytes::from_static(b"abc"));
        assert_eq!(object.mime_type, "image/png");
    }

    #[test]
    fn test_urls_are_unique() {
        let store = ObjectUrlStore::new();
        let a = store.create(Bytes::new(), "image/png");
        let b = store.create(Bytes::new(), "image/png");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_revoke() {
        let store = ObjectUrlStore::new();
        let url = store.create(Bytes::from_static(b"x"), "image/jpeg");

        assert!(store.revoke(&url));
        assert!(store.get(&url).is_none());
        assert!(!store.revoke(&url));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = ObjectUrlStore::new();
        let clone = store.clone();
        let url = clone.create(Bytes::from_static(b"y"), "image/webp");
        assert!(store.get(&url).is_some());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = ObjectUrlStore::with_capacity(2);
        let first = store.create(Bytes::from_static(b"1"), "image/png");
        let second = store.create(Bytes::from_static(b"22"), "image/png");
        let third = store.create(Bytes::from_static(b"333"), "image/png");

        assert_eq!(store.len(), 2);
        assert!(store.get(&first).is_none());
        assert!(store.get(&second).is_some());
        assert!(store.get(&third).is_some());
        assert_eq!(store.retained_bytes(), 5);
    }

    #[test]
    fn test_revoked_entries_free_capacity() {
        let store = ObjectUrlStore::with_capacity(2);
        let first = store.create(Bytes::from_static(b"a"), "image/png");
        let second = store.create(Bytes::from_static(b"b"), "image/png");
        assert!(store.revoke(&second));

        let third = store.create(Bytes::from_static(b"c"), "image/png");
        assert!(store.get(&first).is_some());
        assert!(store.get(&third).is_some());
    }

    #[test]
    fn test_unbounded_store_keeps_everything() {
        let store = ObjectUrlStore::new();
        assert_eq!(store.capacity(), None);
        for _ in 0..50 {
            store.create(Bytes::from_static(b"z"), "image/png");
        }
        assert_eq!(store.len(), 50);
        assert_eq!(ObjectUrlStore::with_capacity(0).capacity(), Some(1));
    }
}
