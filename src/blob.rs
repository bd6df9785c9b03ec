//! Revocable local references to in-memory byte buffers.
//!
//! A [`BlobHandle`] is what a rendering layer binds to an audio player or a
//! download link: an opaque `blob:audio2midi/<n>` URL plus shared access to
//! the bytes behind it. The [`BlobStore`] that minted it keeps a registry of
//! live URLs; dropping the handle revokes its URL. The controller holds at
//! most one preview handle and one result handle, so superseding either
//! releases the old buffer.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::trace;

const URL_PREFIX: &str = "blob:audio2midi/";

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    live: HashSet<u64>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mints and tracks [`BlobHandle`]s. Cheap to clone; clones share a registry.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    registry: Arc<Mutex<Registry>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` and return a handle that revokes itself on drop.
    pub fn create(&self, data: Arc<[u8]>) -> BlobHandle {
        let id = {
            let mut reg = lock(&self.registry);
            let id = reg.next_id;
            reg.next_id += 1;
            reg.live.insert(id);
            id
        };
        trace!("blob {} created ({} bytes)", id, data.len());
        BlobHandle {
            id,
            url: format!("{URL_PREFIX}{id}"),
            data,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of handles minted by this store that have not been dropped.
    pub fn live_count(&self) -> usize {
        lock(&self.registry).live.len()
    }

    /// Whether `url` refers to a handle that is still alive.
    pub fn is_live(&self, url: &str) -> bool {
        url.strip_prefix(URL_PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .is_some_and(|id| lock(&self.registry).live.contains(&id))
    }
}

/// An opaque, revocable reference to a byte buffer.
pub struct BlobHandle {
    id: u64,
    url: String,
    data: Arc<[u8]>,
    registry: Weak<Mutex<Registry>>,
}

impl BlobHandle {
    /// Opaque URL identifying this handle while it is alive.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobHandle")
            .field("url", &self.url)
            .field("len", &self.data.len())
            .finish()
    }
}

impl Drop for BlobHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).live.remove(&self.id);
            trace!("blob {} revoked", self.id);
        }
    }
}
