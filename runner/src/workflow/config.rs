use crate::link::tcp::LinkConfig;
use anyhow::{bail, Context};
use guidecore::prelude::EngineConfig;
use guidecore::transport::ReconnectPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub confidence_threshold: f32,
    pub min_box_area: f32,
    pub dispatch_interval_secs: f64,
    /// Companion device address.
    pub address: String,
    /// Channel (port) on the companion device.
    pub channel: u16,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

impl RunnerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading runner config {}", path_ref.display()))?;
        let config: RunnerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing runner config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        confidence_threshold: f32,
        min_box_area: f32,
        dispatch_interval_secs: f64,
        address: String,
        channel: u16,
    ) -> Self {
        Self {
            confidence_threshold,
            min_box_area,
            dispatch_interval_secs,
            address,
            channel,
            reconnect: ReconnectPolicy::default(),
        }
    }

    /// Reject values the throttle cannot work with before the loop starts.
    pub fn validate(self) -> anyhow::Result<Self> {
        if !self.dispatch_interval_secs.is_finite() || self.dispatch_interval_secs < 0.0 {
            bail!(
                "dispatch_interval_secs must be a finite non-negative number, got {}",
                self.dispatch_interval_secs
            );
        }
        Ok(self)
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            confidence_threshold: self.confidence_threshold,
            min_box_area: self.min_box_area,
            dispatch_interval_secs: self.dispatch_interval_secs,
        }
    }

    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            address: self.address.clone(),
            channel: self.channel,
        }
    }
}
