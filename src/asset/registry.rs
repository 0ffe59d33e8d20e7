//! Registry of decoded uploads, keyed by handle
//!
//! A handle stays valid until revoked. [`UploadSlot`] owns at most one live
//! handle and revokes it when replaced, released or dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use parking_lot::RwLock;

use super::{AssetError, AssetHandle};

/// Shared store of decoded images (parking_lot::RwLock, no poisoning).
#[derive(Debug, Default)]
pub struct AssetRegistry {
    images: RwLock<HashMap<AssetHandle, Arc<RgbaImage>>>,
    next_id: AtomicU64,
}

impl AssetRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, image: RgbaImage) -> AssetHandle {
        let handle = AssetHandle(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::debug!(
            "[Assets] registered {} ({}x{})",
            handle,
            image.width(),
            image.height()
        );
        self.images.write().insert(handle, Arc::new(image));
        handle
    }

    pub fn get(&self, handle: AssetHandle) -> Result<Arc<RgbaImage>, AssetError> {
        self.images
            .read()
            .get(&handle)
            .cloned()
            .ok_or(AssetError::Revoked(handle))
    }

    /// Release a handle. Returns false if it was already gone.
    pub fn revoke(&self, handle: AssetHandle) -> bool {
        let removed = self.images.write().remove(&handle).is_some();
        if removed {
            tracing::debug!("[Assets] revoked {}", handle);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.images.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.read().is_empty()
    }
}

/// Holder for the single live upload of one editing slot (e.g. the front photo).
#[derive(Debug)]
pub struct UploadSlot {
    registry: Arc<AssetRegistry>,
    current: Option<AssetHandle>,
}

impl UploadSlot {
    pub fn new(registry: Arc<AssetRegistry>) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    pub fn handle(&self) -> Option<AssetHandle> {
        self.current
    }

    /// Register `image`, revoking whatever the slot held before.
    pub fn replace(&mut self, image: RgbaImage) -> AssetHandle {
        let handle = self.registry.register(image);
        if let Some(previous) = self.current.replace(handle) {
            self.registry.revoke(previous);
        }
        handle
    }

    /// Decoded image for the current handle, if any.
    pub fn image(&self) -> Result<Option<Arc<RgbaImage>>, AssetError> {
        self.current.map(|h| self.registry.get(h)).transpose()
    }

    pub fn release(&mut self) {
        if let Some(handle) = self.current.take() {
            self.registry.revoke(handle);
        }
    }
}

impl Drop for UploadSlot {
    fn drop(&mut self) {
        self.release();
    }
}
