use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Point-in-time view of the loop counters, for summaries and the status
/// bridge.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub frames_processed: usize,
    pub commands_sent: usize,
    pub send_failures: usize,
}

pub struct GuidanceMetrics {
    inner: Mutex<MetricsSnapshot>,
}

impl GuidanceMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_frame(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames_processed += 1;
        }
    }

    pub fn record_command_sent(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.commands_sent += 1;
        }
    }

    pub fn record_send_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.send_failures += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for GuidanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}
