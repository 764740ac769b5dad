use guidecore::transport::{GuidanceLink, TransportError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::net::{Shutdown, TcpStream};

/// Endpoint of the companion device's stream channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub address: String,
    pub channel: u16,
}

impl LinkConfig {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.channel)
    }
}

/// Stream link to the companion device over TCP.
///
/// Connect and send are blocking with no timeout, matching the device
/// baseline: a hung connect blocks startup, a hung send blocks the loop.
pub struct TcpLink {
    stream: Option<TcpStream>,
    config: LinkConfig,
}

impl TcpLink {
    /// Blocking connect at startup; a failure here is fatal for the caller.
    pub fn connect(config: LinkConfig) -> Result<Self, TransportError> {
        let stream = Self::dial(&config)?;
        Ok(Self {
            stream: Some(stream),
            config,
        })
    }

    fn dial(config: &LinkConfig) -> Result<TcpStream, TransportError> {
        let endpoint = config.endpoint();
        TcpStream::connect(&endpoint)
            .map_err(|err| TransportError::Connect(format!("{}: {}", endpoint, err)))
    }
}

impl GuidanceLink for TcpLink {
    fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::Closed)?;
        stream
            .write_all(message)
            .map_err(|err| TransportError::Send(err.to_string()))
    }

    fn reconnect(&mut self) -> Result<(), TransportError> {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.stream = Some(Self::dial(&self.config)?);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}
