use guidecore::telemetry::LogManager;
use guidecore::transport::{GuidanceLink, TransportError};

/// Link for dry runs: guidance commands are logged instead of transmitted.
pub struct NullLink {
    logger: LogManager,
    sent: usize,
}

impl NullLink {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new(),
            sent: 0,
        }
    }

    #[cfg(test)]
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl Default for NullLink {
    fn default() -> Self {
        Self::new()
    }
}

impl GuidanceLink for NullLink {
    fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        self.sent += 1;
        self.logger.record(&format!(
            "dry-run command: {}",
            String::from_utf8_lossy(message)
        ));
        Ok(())
    }

    fn reconnect(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn close(&mut self) {}
}
