use crate::workflow::config::RunnerConfig;
use anyhow::Context;
use guidecore::detector_interface::{DetectionSource, FrameOutput};
use guidecore::dispatch::DispatchThrottle;
use guidecore::pipeline::{decide, GuidanceDecision, IngestStage, ZoneMasses, ZoneStage};
use guidecore::prelude::PipelineStage;
use guidecore::telemetry::{GuidanceMetrics, MetricsSnapshot};
use guidecore::transport::{GuidanceLink, TransportSession};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Outcome of one frame-loop run.
pub struct LoopSummary {
    pub metrics: MetricsSnapshot,
    pub last_decision: Option<GuidanceDecision>,
    pub last_masses: ZoneMasses,
}

/// Orchestrates the perception-to-guidance loop: frames from the detection
/// source are filtered and folded into zone masses every frame, while the
/// throttle gate decides when a directional command actually goes out.
#[derive(Clone)]
pub struct GuidanceLoop {
    config: RunnerConfig,
}

impl GuidanceLoop {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run one frame through ingest and zone aggregation.
    pub fn evaluate_frame(&self, frame: FrameOutput) -> anyhow::Result<ZoneMasses> {
        let engine_config = self.config.to_engine_config();

        let mut ingest_stage = IngestStage::new();
        ingest_stage
            .initialize(&engine_config)
            .context("initializing ingest stage")?;
        let accepted = ingest_stage
            .execute(frame)
            .context("executing ingest stage")?;
        ingest_stage.cleanup();

        let mut zone_stage = ZoneStage::new();
        zone_stage
            .initialize(&engine_config)
            .context("initializing zone stage")?;
        let masses = zone_stage
            .execute(accepted)
            .context("executing zone stage")?;
        zone_stage.cleanup();

        Ok(masses)
    }

    /// Drive the frame loop until the source ends, a read fails, or the stop
    /// flag is raised. The source and session are released on every exit
    /// path, including stage errors.
    pub fn run<S, L>(
        &self,
        source: &mut S,
        session: &mut TransportSession<L>,
        stop: &AtomicBool,
    ) -> anyhow::Result<LoopSummary>
    where
        S: DetectionSource,
        L: GuidanceLink,
    {
        let result = self.drive(source, session, stop);
        source.release();
        session.close();
        result
    }

    fn drive<S, L>(
        &self,
        source: &mut S,
        session: &mut TransportSession<L>,
        stop: &AtomicBool,
    ) -> anyhow::Result<LoopSummary>
    where
        S: DetectionSource,
        L: GuidanceLink,
    {
        let metrics = GuidanceMetrics::new();
        let engine_config = self.config.to_engine_config();
        let interval = Duration::from_secs_f64(engine_config.dispatch_interval_secs);
        let mut throttle = DispatchThrottle::new(interval, Instant::now());
        let mut last_decision = None;
        let mut last_masses = ZoneMasses::default();

        loop {
            if stop.load(Ordering::Relaxed) {
                info!("stop requested, ending frame loop");
                break;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("detection source reached end of stream");
                    break;
                }
                Err(err) => {
                    warn!("frame read failed, ending loop: {}", err);
                    break;
                }
            };

            let masses = self.evaluate_frame(frame)?;
            metrics.record_frame();

            let now = Instant::now();
            if throttle.ready(now) {
                let decision = decide(&masses);
                info!("Sending guidance command: {}", decision.as_message());
                match session.send(decision.as_message().as_bytes(), now) {
                    Ok(()) => metrics.record_command_sent(),
                    Err(err) => {
                        warn!("guidance send failed, command dropped: {}", err);
                        metrics.record_send_failure();
                    }
                }
                // The gate advances whether or not the send went through, so a
                // degraded link never triggers an immediate retry.
                throttle.record_dispatch(now);
                last_decision = Some(decision);
            }
            last_masses = masses;
        }

        Ok(LoopSummary {
            metrics: metrics.snapshot(),
            last_decision,
            last_masses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::scene::{SceneConfig, SyntheticSource};
    use guidecore::transport::{ReconnectPolicy, TransportError};
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingLink {
        messages: Arc<Mutex<Vec<String>>>,
        fail_sends: bool,
    }

    impl GuidanceLink for RecordingLink {
        fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
            if self.fail_sends {
                return Err(TransportError::Send("link down".into()));
            }
            self.messages
                .lock()
                .unwrap()
                .push(String::from_utf8(message.to_vec()).unwrap());
            Ok(())
        }

        fn reconnect(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        fn close(&mut self) {}
    }

    fn test_config(interval_secs: f64) -> RunnerConfig {
        RunnerConfig::from_args(0.5, 0.01, interval_secs, "127.0.0.1".into(), 9100)
    }

    #[test]
    fn zero_interval_sends_one_command_per_frame() {
        let engine = GuidanceLoop::new(test_config(0.0));
        let mut source = SyntheticSource::new(SceneConfig {
            frames: 12,
            ..Default::default()
        });
        let link = RecordingLink::default();
        let messages = link.messages.clone();
        let mut session = TransportSession::new(link, ReconnectPolicy::None);

        let stop = AtomicBool::new(false);
        let summary = engine.run(&mut source, &mut session, &stop).unwrap();

        assert_eq!(summary.metrics.frames_processed, 12);
        assert_eq!(summary.metrics.commands_sent, 12);
        assert_eq!(summary.metrics.send_failures, 0);
        assert!(summary.last_decision.is_some());

        let sent = messages.lock().unwrap();
        assert_eq!(sent.len(), 12);
        for message in sent.iter() {
            assert!(matches!(
                message.as_str(),
                "Move left" | "Move right" | "Move forward"
            ));
        }
    }

    #[test]
    fn long_interval_sends_nothing_on_a_short_run() {
        let engine = GuidanceLoop::new(test_config(5.0));
        let mut source = SyntheticSource::new(SceneConfig {
            frames: 10,
            ..Default::default()
        });
        let mut session = TransportSession::new(RecordingLink::default(), ReconnectPolicy::None);

        let stop = AtomicBool::new(false);
        let summary = engine.run(&mut source, &mut session, &stop).unwrap();

        assert_eq!(summary.metrics.frames_processed, 10);
        assert_eq!(summary.metrics.commands_sent, 0);
        assert!(summary.last_decision.is_none());
    }

    #[test]
    fn failing_link_does_not_stop_the_loop() {
        let engine = GuidanceLoop::new(test_config(0.0));
        let mut source = SyntheticSource::new(SceneConfig {
            frames: 8,
            ..Default::default()
        });
        let link = RecordingLink {
            fail_sends: true,
            ..Default::default()
        };
        let mut session = TransportSession::new(link, ReconnectPolicy::None);

        let stop = AtomicBool::new(false);
        let summary = engine.run(&mut source, &mut session, &stop).unwrap();

        assert_eq!(summary.metrics.frames_processed, 8);
        assert_eq!(summary.metrics.commands_sent, 0);
        assert_eq!(summary.metrics.send_failures, 8);
    }

    #[test]
    fn failed_send_still_opens_a_full_throttle_window() {
        let start = Instant::now();
        let mut throttle = DispatchThrottle::new(Duration::from_secs(5), start);
        let link = RecordingLink {
            fail_sends: true,
            ..Default::default()
        };
        let mut session = TransportSession::new(link, ReconnectPolicy::None);

        let tick = start + Duration::from_secs(5);
        assert!(throttle.ready(tick));
        assert!(session.send(b"Move forward", tick).is_err());
        throttle.record_dispatch(tick);

        // No immediate retry after the failure: the next dispatch comes a
        // full interval after the failed attempt, not before.
        assert!(!throttle.ready(tick + Duration::from_secs(4)));
        assert!(throttle.ready(tick + Duration::from_secs(5)));
    }

    #[test]
    fn resources_are_released_on_normal_exit() {
        let engine = GuidanceLoop::new(test_config(5.0));
        let mut source = SyntheticSource::new(SceneConfig {
            frames: 2,
            ..Default::default()
        });
        let mut session = TransportSession::new(RecordingLink::default(), ReconnectPolicy::None);

        let stop = AtomicBool::new(false);
        engine.run(&mut source, &mut session, &stop).unwrap();

        assert!(source.released());
        assert_eq!(
            session.state(),
            guidecore::transport::SessionState::Closed
        );
    }

    #[test]
    fn raised_stop_flag_ends_the_loop_before_any_frame() {
        let engine = GuidanceLoop::new(test_config(0.0));
        let mut source = SyntheticSource::new(SceneConfig::default());
        let mut session = TransportSession::new(RecordingLink::default(), ReconnectPolicy::None);

        let stop = AtomicBool::new(true);
        let summary = engine.run(&mut source, &mut session, &stop).unwrap();
        assert_eq!(summary.metrics.frames_processed, 0);
    }
}
