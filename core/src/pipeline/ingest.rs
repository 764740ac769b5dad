use crate::detector_interface::{Detection, FrameOutput};
use crate::prelude::{EngineConfig, PipelineStage, StageError, StageResult};
use crate::telemetry::log::LogManager;

/// Ingest stage that filters raw detector output down to accepted detections.
///
/// An entry is accepted when its score strictly exceeds the confidence
/// threshold and its normalized box area is at least the minimum. Original
/// detector order is preserved.
pub struct IngestStage {
    config: Option<EngineConfig>,
    logger: LogManager,
}

impl IngestStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for IngestStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for IngestStage {
    type Input = FrameOutput;
    type Output = Vec<Detection>;

    fn initialize(&mut self, config: &EngineConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: FrameOutput) -> StageResult<Vec<Detection>> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        if !input.is_consistent() {
            return Err(StageError::InvalidInput(format!(
                "parallel sequence length mismatch: {} boxes, {} classes, {} scores",
                input.boxes.len(),
                input.class_ids.len(),
                input.scores.len()
            )));
        }

        let raw_count = input.detection_count();
        let mut accepted = Vec::with_capacity(raw_count);
        for ((bounds, class_id), score) in input
            .boxes
            .into_iter()
            .zip(input.class_ids)
            .zip(input.scores)
        {
            if score > config.confidence_threshold && bounds.area() >= config.min_box_area {
                accepted.push(Detection::new(bounds, class_id, score));
            }
        }

        self.logger.record_debug(&format!(
            "IngestStage frame {} accepted {}/{}",
            input.ancillary.frame_index,
            accepted.len(),
            raw_count
        ));

        Ok(accepted)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
