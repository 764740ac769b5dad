use guidecore::pipeline::ZoneMasses;
use guidecore::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Latest loop state served by the status bridge. Strictly downstream of the
/// decision path: nothing reads it back into the loop.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusModel {
    pub zone_masses: ZoneMasses,
    pub last_decision: Option<String>,
    pub metrics: MetricsSnapshot,
}
