pub mod detection;
pub mod frame;
pub mod source;

pub use detection::{BoundingBox, Detection};
pub use frame::{FrameAncillary, FrameOutput};
pub use source::{DetectionSource, SourceError};
