use std::collections::HashMap;
use std::sync::Arc;

use crate::mask::{MaskRef, OccupancyBuffer};

/// Decoded-mask cache for one playback session. Entries are immutable:
/// once a reference resolves to a buffer, later inserts under the same
/// reference are ignored.
#[derive(Debug, Default)]
pub struct MaskCache {
    entries: HashMap<MaskRef, Arc<OccupancyBuffer>>,
}

impl MaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, mask: &MaskRef) -> Option<Arc<OccupancyBuffer>> {
        self.entries.get(mask).cloned()
    }

    #[inline]
    pub fn contains(&self, mask: &MaskRef) -> bool {
        self.entries.contains_key(mask)
    }

    /// Insert unless the reference is already present; returns the cached
    /// buffer either way.
    pub fn insert_if_absent(&mut self, mask: MaskRef, buffer: OccupancyBuffer) -> Arc<OccupancyBuffer> {
        self.entries
            .entry(mask)
            .or_insert_with(|| Arc::new(buffer))
            .clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
