/**
 * Blob Store Boundary
 *
 * Two-phase upload contract:
 *
 * 1. `create_upload()` returns a write-once upload ticket (ID + URL)
 * 2. the client PUTs bytes to the URL, receiving an opaque storage ID
 * 3. the storage ID is what gets stored on a message; it is resolved
 *    back to a fetchable URL at read time
 *
 * The production deployment fronts a managed object store; this
 * in-process implementation keeps bytes in memory behind the same
 * interface so the messaging core and its tests are self-contained.
 */

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use uuid::Uuid;

/// Ticket returned by phase one of an upload
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UploadTicket {
    /// Write-once upload slot
    pub upload_id: Uuid,
    /// Where to PUT the bytes
    pub url: String,
}

/// Response of phase two: the opaque handle to store on a message
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UploadComplete {
    pub storage_id: String,
}

#[derive(Default)]
struct BlobInner {
    /// Tickets issued but not yet consumed
    open_uploads: HashSet<Uuid>,
    /// Stored blobs by storage ID
    objects: HashMap<String, Bytes>,
}

/// In-process blob store
#[derive(Clone, Default)]
pub struct BlobStore {
    inner: Arc<RwLock<BlobInner>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase one: issue a write-once upload ticket
    pub fn create_upload(&self) -> UploadTicket {
        let upload_id = Uuid::new_v4();
        self.inner.write().unwrap().open_uploads.insert(upload_id);
        UploadTicket {
            upload_id,
            url: format!("/api/storage/{}", upload_id),
        }
    }

    /// Phase two: consume a ticket with the uploaded bytes.
    ///
    /// Fails if the ticket is unknown or already consumed (write-once).
    pub fn complete_upload(&self, upload_id: Uuid, bytes: Bytes) -> Option<String> {
        let mut inner = self.inner.write().unwrap();
        if !inner.open_uploads.remove(&upload_id) {
            return None;
        }
        let storage_id = upload_id.to_string();
        inner.objects.insert(storage_id.clone(), bytes);
        Some(storage_id)
    }

    /// Resolve a storage ID to a fetchable URL.
    ///
    /// Returns `None` for unknown IDs; callers treat that as a resolution
    /// failure for one message, not a batch failure.
    pub fn resolve(&self, storage_id: &str) -> Option<String> {
        let inner = self.inner.read().unwrap();
        if inner.objects.contains_key(storage_id) {
            Some(format!("/api/storage/{}", storage_id))
        } else {
            None
        }
    }

    /// Fetch stored bytes (serving side of the resolved URL)
    pub fn get(&self, storage_id: &str) -> Option<Bytes> {
        self.inner.read().unwrap().objects.get(storage_id).cloned()
    }
}
