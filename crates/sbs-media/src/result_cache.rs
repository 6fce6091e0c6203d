//! Cache of finished conversion results keyed by video and parameters.

use parking_lot::Mutex;
use sbs_core::{ConversionOptions, VideoRef};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Reference to a produced stereo artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub id: Uuid,
    pub video: VideoRef,
    pub options: ConversionOptions,
    pub shift_percent: f64,
    /// Source locator annotated with the applied shift.
    pub locator: String,
}

impl ConversionResult {
    pub fn new(video: &VideoRef, options: &ConversionOptions, shift_percent: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            video: video.clone(),
            options: *options,
            shift_percent,
            locator: format!("{}#sbs&shift={:.2}", video, shift_percent),
        }
    }
}

/// Identity of a conversion: the video plus the distances that shape it.
///
/// Distances are compared bit-for-bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultKey {
    video: VideoRef,
    pupil_distance: u64,
    convergence_distance: u64,
}

impl ResultKey {
    pub fn new(video: &VideoRef, options: &ConversionOptions) -> Self {
        Self {
            video: video.clone(),
            pupil_distance: options.pupil_distance.to_bits(),
            convergence_distance: options.convergence_distance.to_bits(),
        }
    }
}

/// Finished results, kept until [`ResultCache::clear`]. No expiry.
#[derive(Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<ResultKey, Arc<ConversionResult>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ResultKey) -> Option<Arc<ConversionResult>> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: ResultKey, result: Arc<ConversionResult>) {
        self.entries.lock().insert(key, result);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
