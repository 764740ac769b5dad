pub mod session;

pub use session::{SessionState, TransportSession};

use serde::{Deserialize, Serialize};

/// Failure on the radio link to the companion device.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("send failed: {0}")]
    Send(String),
    #[error("session already closed")]
    Closed,
}

/// Connection-oriented, stream-based channel to the paired device.
///
/// Pairing, discovery, and the physical radio protocol live behind this
/// seam; the core only needs send/re-dial/close semantics. `close` must be
/// idempotent.
pub trait GuidanceLink {
    /// Single unframed write of the message bytes. No acknowledgment.
    fn send(&mut self, message: &[u8]) -> Result<(), TransportError>;

    /// Tear down and re-dial the underlying channel.
    fn reconnect(&mut self) -> Result<(), TransportError>;

    fn close(&mut self);
}

/// What the session does about a link that failed a send.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReconnectPolicy {
    /// Baseline behavior: failures degrade to dropped commands, the link is
    /// never re-dialed. Intentional on flaky links, where reconnect storms
    /// are worse than silence.
    #[default]
    None,
    /// Re-dial before the next send that comes at least `delay_secs` after
    /// the failure.
    FixedBackoff { delay_secs: f64 },
}
