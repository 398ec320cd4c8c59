use std::collections::HashMap;

use super::{TextureHandle, TextureInfo};

struct Entry<T> {
    info: TextureInfo,
    resource: T,
}

struct Retired<T> {
    handle: TextureHandle,
    release_at: u64,
    resource: T,
}

/// Side table from [`TextureHandle`] to a backend texture object `T`.
///
/// Handles are issued from a monotonic counter and never reused. Removing a handle
/// unpublishes it immediately, but the backend object is parked until
/// `retire_latency` more frames have completed, so work recorded before the removal
/// can still resolve it.
pub struct TextureRegistry<T> {
    live: HashMap<TextureHandle, Entry<T>>,
    retired: Vec<Retired<T>>,
    next_id: u32,
    completed_frames: u64,
    retire_latency: u64,
}

impl<T> TextureRegistry<T> {
    pub fn new(retire_latency: u64) -> Self {
        Self {
            live: HashMap::new(),
            retired: Vec::new(),
            next_id: 1,
            completed_frames: 0,
            retire_latency,
        }
    }

    /// Publishes `resource` under a fresh handle.
    ///
    /// Returns [`TextureHandle::INVALID`] (dropping `resource`) once the handle space is
    /// exhausted; handles are never recycled.
    pub fn insert(&mut self, info: TextureInfo, resource: T) -> TextureHandle {
        if self.next_id == 0 {
            log::error!("texture handle space exhausted; refusing to alias handles");
            return TextureHandle::INVALID;
        }
        let handle = TextureHandle::from_raw(self.next_id);
        // Wraps to 0 after u32::MAX, which marks the space as exhausted.
        self.next_id = self.next_id.wrapping_add(1);
        self.live.insert(handle, Entry { info, resource });
        handle
    }

    /// Unpublishes `handle`. Unknown and invalid handles are ignored.
    ///
    /// Returns `true` if a live texture was removed.
    pub fn remove(&mut self, handle: TextureHandle) -> bool {
        let Some(entry) = self.live.remove(&handle) else {
            return false;
        };
        if self.retire_latency > 0 {
            self.retired.push(Retired {
                handle,
                release_at: self.completed_frames + self.retire_latency,
                resource: entry.resource,
            });
        }
        true
    }

    /// Live lookup: only published handles resolve.
    #[inline]
    pub fn get(&self, handle: TextureHandle) -> Option<&T> {
        self.live.get(&handle).map(|e| &e.resource)
    }

    /// Replay lookup: live handles and handles removed within the retire window resolve.
    pub fn resolve(&self, handle: TextureHandle) -> Option<&T> {
        self.get(handle).or_else(|| {
            self.retired
                .iter()
                .find(|r| r.handle == handle)
                .map(|r| &r.resource)
        })
    }

    /// Texture description, or the zeroed value for unknown handles.
    #[inline]
    pub fn info(&self, handle: TextureHandle) -> TextureInfo {
        self.live.get(&handle).map(|e| e.info).unwrap_or_default()
    }

    #[inline]
    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.live.contains_key(&handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of removed textures still waiting for their frames to complete.
    #[inline]
    pub fn pending_release(&self) -> usize {
        self.retired.len()
    }

    /// Marks one frame as completed and drops parked objects whose window has passed.
    ///
    /// Returns the number of released objects.
    pub fn complete_frame(&mut self) -> usize {
        self.completed_frames += 1;
        let now = self.completed_frames;
        let before = self.retired.len();
        self.retired.retain(|r| r.release_at > now);
        before - self.retired.len()
    }

    /// Drops every texture, live or parked. Issued handles stay burned.
    pub fn clear(&mut self) {
        self.live.clear();
        self.retired.clear();
    }
}

impl<T> Default for TextureRegistry<T> {
    fn default() -> Self {
        Self::new(0)
    }
}
