use crate::detector_interface::FrameOutput;

/// Failure reading the next frame from the capture/inference front end.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("frame read failed: {0}")]
    Read(String),
}

/// Seam between the core loop and the camera + detector pair.
///
/// `Ok(None)` signals end of stream; `Err` signals a read failure. The loop
/// treats both as a graceful stop but logs them distinctly, since a transient
/// hardware hiccup and a disconnected camera are different operator problems.
pub trait DetectionSource {
    fn next_frame(&mut self) -> Result<Option<FrameOutput>, SourceError>;

    /// Idempotent teardown of the underlying capture resource.
    fn release(&mut self);
}
