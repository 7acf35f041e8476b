//! Preview handles for staged images
//!
//! A preview handle is a display-only reference (`blob:sommaire/<id>`) to a
//! client-local resource held in a [`PreviewRegistry`]. Dropping the handle
//! revokes the entry, so replacing a selection releases the previous
//! previews and a revoked reference can no longer be resolved.

use crate::models::ImageFile;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// What a live preview resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSource {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: usize,
}

/// Registry of live preview resources
///
/// Cloning shares the registry.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Mutex<HashMap<Uuid, PreviewSource>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewSource>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a preview for `image`
    pub fn create(&self, image: &ImageFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            PreviewSource {
                file_name: image.file_name.clone(),
                content_type: image.content_type.clone(),
                size_bytes: image.len(),
            },
        );
        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    /// Look up a preview by reference; `None` once revoked
    pub fn resolve(&self, url: &str) -> Option<PreviewSource> {
        let id = url
            .strip_prefix(PreviewHandle::URL_PREFIX)
            .and_then(|s| Uuid::parse_str(s).ok())?;
        self.lock().get(&id).cloned()
    }

    /// Number of previews not yet released
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, id: Uuid) {
        self.lock().remove(&id);
    }
}

impl fmt::Debug for PreviewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Owned reference to a registered preview; revoked on drop
pub struct PreviewHandle {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    const URL_PREFIX: &'static str = "blob:sommaire/";

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display reference, e.g. for an `<img src>` or a terminal listing
    pub fn url(&self) -> String {
        format!("{}{}", Self::URL_PREFIX, self.id)
    }

    /// Resolve through the owning registry
    pub fn source(&self) -> Option<PreviewSource> {
        self.registry.resolve(&self.url())
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.revoke(self.id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.url()).finish()
    }
}
