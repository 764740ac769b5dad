pub mod ingest;
pub mod policy;
pub mod zones;

pub use ingest::IngestStage;
pub use policy::{decide, GuidanceDecision};
pub use zones::{ZoneMasses, ZoneStage};
