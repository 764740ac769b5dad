use guidecore::detector_interface::{
    BoundingBox, DetectionSource, FrameAncillary, FrameOutput, SourceError,
};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const SYNTHETIC_FRAME_RATE: f64 = 30.0;

/// Configuration for the synthetic detection scene.
///
/// The scene stands in for the camera + detector pair: a small cluster of
/// obstacles sweeps across the field of view so every zone gets hazard mass
/// over the course of a run, plus one sub-threshold distractor per frame to
/// exercise the ingest filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub frames: usize,
    pub detections_per_frame: usize,
    pub seed: u64,
    /// Horizontal drift of the obstacle cluster per frame, in normalized
    /// frame widths.
    pub drift: f32,
    /// Lower bound for generated detector scores.
    pub score_floor: f32,
    pub description: Option<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            frames: 40,
            detections_per_frame: 3,
            seed: 0,
            drift: 0.015,
            score_floor: 0.55,
            description: None,
        }
    }
}

pub fn build_frame_output(config: &SceneConfig, frame_index: u64, rng: &mut StdRng) -> FrameOutput {
    let capacity = config.detections_per_frame + 1;
    let mut boxes = Vec::with_capacity(capacity);
    let mut class_ids = Vec::with_capacity(capacity);
    let mut scores = Vec::with_capacity(capacity);

    let sweep = (frame_index as f32 * config.drift) % 0.9;
    for slot in 0..config.detections_per_frame {
        let spread = slot as f32 * 0.08;
        let x_center = (0.08 + sweep + spread).min(0.95);
        let width = rng.gen_range(0.12..0.3);
        let height: f32 = rng.gen_range(0.15..0.4);
        let xmin = (x_center - width / 2.0).clamp(0.0, 1.0);
        let xmax = (x_center + width / 2.0).clamp(0.0, 1.0);
        boxes.push(BoundingBox::new(xmin, 0.3, xmax, (0.3 + height).min(1.0)));
        class_ids.push(rng.gen_range(0..10));
        scores.push(rng.gen_range(config.score_floor..1.0));
    }

    // Sub-threshold distractor the ingest stage must drop.
    boxes.push(BoundingBox::new(0.45, 0.45, 0.6, 0.6));
    class_ids.push(0);
    scores.push(0.2);

    FrameOutput::new(
        boxes,
        class_ids,
        scores,
        FrameAncillary {
            timestamp: frame_index as f64 / SYNTHETIC_FRAME_RATE,
            frame_index,
        },
    )
}

/// Seeded offline detection source yielding a fixed number of frames.
pub struct SyntheticSource {
    config: SceneConfig,
    rng: StdRng,
    next_index: u64,
    released: bool,
}

impl SyntheticSource {
    pub fn new(config: SceneConfig) -> Self {
        if let Some(description) = config.description.as_deref() {
            info!("synthetic scene: {}", description);
        }
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            next_index: 0,
            released: false,
        }
    }

    #[cfg(test)]
    pub fn released(&self) -> bool {
        self.released
    }
}

impl DetectionSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<FrameOutput>, SourceError> {
        if self.next_index >= self.config.frames as u64 {
            return Ok(None);
        }
        let frame = build_frame_output(&self.config, self.next_index, &mut self.rng);
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        if !self.released {
            info!("synthetic detection source released");
            self.released = true;
        }
    }
}
