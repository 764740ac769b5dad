use crate::detector_interface::Detection;
use crate::prelude::{EngineConfig, PipelineStage, StageError, StageResult};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

/// Normalized x-center below this falls in the left zone (strict).
pub const ZONE_LEFT_BOUND: f32 = 0.33;
/// Normalized x-center above this falls in the right zone (strict).
pub const ZONE_RIGHT_BOUND: f32 = 0.66;

/// Per-zone hazard mass for one frame: the sum of normalized box areas of
/// the accepted detections whose horizontal center falls in each zone.
/// Recomputed from scratch every frame, never carried across frames.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ZoneMasses {
    pub left: f32,
    pub center: f32,
    pub right: f32,
}

impl ZoneMasses {
    /// Add one detection's area to the zone owning `x_center`. The outer
    /// zones are strict, so a center exactly on a bound counts as center.
    pub fn accumulate(&mut self, x_center: f32, area: f32) {
        if x_center < ZONE_LEFT_BOUND {
            self.left += area;
        } else if x_center > ZONE_RIGHT_BOUND {
            self.right += area;
        } else {
            self.center += area;
        }
    }
}

/// Zone stage that folds one frame's accepted detections into hazard masses.
pub struct ZoneStage {
    config: Option<EngineConfig>,
    logger: LogManager,
}

impl ZoneStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for ZoneStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for ZoneStage {
    type Input = Vec<Detection>;
    type Output = ZoneMasses;

    fn initialize(&mut self, config: &EngineConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: Vec<Detection>) -> StageResult<ZoneMasses> {
        self.config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let mut masses = ZoneMasses::default();
        for detection in input {
            masses.accumulate(detection.bounds.x_center(), detection.bounds.area());
        }

        self.logger.record_debug(&format!(
            "ZoneStage masses L {:.4} C {:.4} R {:.4}",
            masses.left, masses.center, masses.right
        ));

        Ok(masses)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector_interface::BoundingBox;

    fn detection(xmin: f32, xmax: f32, height: f32) -> Detection {
        Detection::new(BoundingBox::new(xmin, 0.4, xmax, 0.4 + height), 1, 0.9)
    }

    fn initialized_stage() -> ZoneStage {
        let mut stage = ZoneStage::new();
        stage.initialize(&EngineConfig::default()).unwrap();
        stage
    }

    #[test]
    fn empty_input_yields_all_zero_masses() {
        let mut stage = initialized_stage();
        let masses = stage.execute(vec![]).unwrap();
        assert_eq!(masses.left, 0.0);
        assert_eq!(masses.center, 0.0);
        assert_eq!(masses.right, 0.0);
    }

    #[test]
    fn centers_exactly_on_a_bound_count_as_center() {
        let mut masses = ZoneMasses::default();
        masses.accumulate(ZONE_LEFT_BOUND, 0.25);
        masses.accumulate(ZONE_RIGHT_BOUND, 0.25);
        assert_eq!(masses.left, 0.0);
        assert_eq!(masses.right, 0.0);
        assert_eq!(masses.center, 0.5);
    }

    #[test]
    fn centers_just_past_a_bound_leave_the_center_zone() {
        let mut masses = ZoneMasses::default();
        masses.accumulate(0.3299, 0.1);
        masses.accumulate(0.6601, 0.1);
        assert!(masses.left > 0.0);
        assert!(masses.right > 0.0);
        assert_eq!(masses.center, 0.0);
    }

    #[test]
    fn masses_sum_contributing_areas_per_zone() {
        let mut stage = initialized_stage();
        let masses = stage
            .execute(vec![
                detection(0.05, 0.15, 0.2),  // left, area 0.02
                detection(0.4, 0.6, 0.2),    // center, area 0.04
                detection(0.85, 0.95, 0.1),  // right, area 0.01
                detection(0.1, 0.2, 0.1),    // left, area 0.01
            ])
            .unwrap();
        assert!((masses.left - 0.03).abs() < 1e-6);
        assert!((masses.center - 0.04).abs() < 1e-6);
        assert!((masses.right - 0.01).abs() < 1e-6);
    }

    #[test]
    fn crowded_left_zone_accumulates_full_mass() {
        // Ten boxes of area 0.05 all centered at x 0.1.
        let mut stage = initialized_stage();
        let detections: Vec<Detection> =
            (0..10).map(|_| detection(0.0, 0.2, 0.25)).collect();
        let masses = stage.execute(detections).unwrap();
        assert!((masses.left - 0.5).abs() < 1e-5);
        assert_eq!(masses.center, 0.0);
        assert_eq!(masses.right, 0.0);
    }

    #[test]
    fn uninitialized_stage_reports_internal_error() {
        let mut stage = ZoneStage::new();
        assert!(matches!(
            stage.execute(vec![]),
            Err(StageError::Internal(_))
        ));
    }
}
