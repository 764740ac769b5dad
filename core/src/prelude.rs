use serde::{Deserialize, Serialize};

/// Shared configuration for the guidance pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum detector score (exclusive) for a detection to be accepted.
    pub confidence_threshold: f32,
    /// Minimum normalized box area (inclusive) for a detection to be accepted.
    pub min_box_area: f32,
    /// Seconds between outgoing guidance commands.
    pub dispatch_interval_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            min_box_area: 0.01,
            dispatch_interval_secs: 5.0,
        }
    }
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing the per-frame guidance pipeline stages.
pub trait PipelineStage {
    type Input;
    type Output;

    fn initialize(&mut self, config: &EngineConfig) -> StageResult<()>;
    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output>;
    fn cleanup(&mut self);
}
