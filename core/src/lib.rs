//! Decision and dispatch core for the assistive navigation platform.
//!
//! The modules mirror the device's perception-to-guidance loop while providing
//! safe abstractions, typed failures, and well-defined pipeline stages: raw
//! detector output is filtered, folded into per-zone hazard mass, turned into
//! a directional command, and handed to a throttled transport session.

pub mod detector_interface;
pub mod dispatch;
pub mod pipeline;
pub mod prelude;
pub mod telemetry;
pub mod transport;

pub use prelude::{EngineConfig, PipelineStage, StageError, StageResult};
