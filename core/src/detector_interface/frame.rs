use crate::detector_interface::BoundingBox;
use serde::{Deserialize, Serialize};

/// Ancillary metadata accompanying each frame's detector output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameAncillary {
    pub timestamp: f64,
    pub frame_index: u64,
}

/// Raw per-frame output of the object detector: parallel sequences of
/// boxes, class ids, and scores of equal length, ordered by detection index.
///
/// The model that produced it is opaque to the core; only this contract
/// matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutput {
    pub boxes: Vec<BoundingBox>,
    pub class_ids: Vec<u32>,
    pub scores: Vec<f32>,
    pub ancillary: FrameAncillary,
}

impl FrameOutput {
    pub fn new(
        boxes: Vec<BoundingBox>,
        class_ids: Vec<u32>,
        scores: Vec<f32>,
        ancillary: FrameAncillary,
    ) -> Self {
        Self {
            boxes,
            class_ids,
            scores,
            ancillary,
        }
    }

    /// Number of raw (unfiltered) detections in this frame.
    pub fn detection_count(&self) -> usize {
        self.boxes.len()
    }

    /// True when the three parallel sequences agree on length.
    pub fn is_consistent(&self) -> bool {
        self.boxes.len() == self.class_ids.len() && self.boxes.len() == self.scores.len()
    }
}
