//! Bounded FIFO cache of extracted frames.
//!
//! Entries are evicted strictly in insertion order once the cache holds more
//! than `capacity` frames. Reads do not refresh an entry's position.

use crate::source::FrameRequest;
use parking_lot::Mutex;
use sbs_core::{memory_budget, FrameId, SharedFrame, VideoRef};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Cache key: which frame of which video, at which size and pixel format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub video: VideoRef,
    pub index: FrameId,
    pub request: FrameRequest,
}

impl FrameKey {
    pub fn new(video: &VideoRef, index: FrameId, request: FrameRequest) -> Self {
        Self {
            video: video.clone(),
            index,
            request,
        }
    }
}

/// Insertion-ordered frame cache with a fixed entry capacity.
pub struct FrameCache {
    entries: HashMap<FrameKey, SharedFrame>,
    /// Insertion order (oldest first).
    order: VecDeque<FrameKey>,
    capacity: usize,
}

/// Frame cache shared between a controller and its observers.
pub type SharedFrameCache = Arc<Mutex<FrameCache>>;

impl FrameCache {
    /// Create a cache holding at most `capacity` frames (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Wrap a new cache for sharing.
    pub fn shared(capacity: usize) -> SharedFrameCache {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Check if a frame is in the cache.
    pub fn contains(&self, key: &FrameKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Get a cached frame.
    pub fn get(&self, key: &FrameKey) -> Option<SharedFrame> {
        self.entries.get(key).cloned()
    }

    /// Insert a frame, evicting the oldest entries past capacity.
    ///
    /// Re-inserting an existing key replaces its frame but keeps its
    /// original position in the eviction order.
    pub fn insert(&mut self, key: FrameKey, frame: SharedFrame) {
        if self.entries.insert(key.clone(), frame).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    /// Number of cached frames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the entire cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new(memory_budget::FRAME_CACHE_CAPACITY)
    }
}
