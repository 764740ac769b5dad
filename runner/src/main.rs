use anyhow::Context;
use clap::Parser;
use generator::scene::{SceneConfig, SyntheticSource};
use guidecore::transport::TransportSession;
use link::null::NullLink;
use link::tcp::TcpLink;
use monitor::bridge::MonitorBridge;
use monitor::model::StatusModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::RunnerConfig;
use workflow::runner::{GuidanceLoop, LoopSummary};

mod generator;
mod link;
mod monitor;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Device-side driver for the directional guidance engine")]
struct Args {
    /// Run the frame loop against the synthetic detection source
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a runner config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 0.5)]
    confidence_threshold: f32,
    #[arg(long, default_value_t = 0.01)]
    min_box_area: f32,
    /// Seconds between outgoing guidance commands
    #[arg(long, default_value_t = 5.0)]
    interval_secs: f64,
    /// Companion device address
    #[arg(long, default_value = "127.0.0.1")]
    address: String,
    /// Companion device channel
    #[arg(long, default_value_t = 9100)]
    channel: u16,
    /// Number of synthetic frames for offline runs
    #[arg(long, default_value_t = 40)]
    frames: usize,
    /// Log guidance commands instead of dialing the companion device
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Keep the status bridge alive for incoming requests
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let runner_config = if let Some(path) = args.config.clone() {
        RunnerConfig::load(path)?
    } else {
        RunnerConfig::from_args(
            args.confidence_threshold,
            args.min_box_area,
            args.interval_secs,
            args.address.clone(),
            args.channel,
        )
    }
    .validate()?;

    let engine = GuidanceLoop::new(runner_config.clone());
    let bridge = MonitorBridge::new(Arc::new(engine.clone()));
    let stop = Arc::new(AtomicBool::new(false));
    spawn_signal_watcher(stop.clone())?;

    if args.offline {
        let scene = SceneConfig {
            frames: args.frames,
            ..Default::default()
        };
        let mut source = SyntheticSource::new(scene);

        let summary = if args.dry_run {
            let mut session = TransportSession::new(NullLink::new(), runner_config.reconnect);
            engine.run(&mut source, &mut session, &stop)?
        } else {
            let tcp_link = TcpLink::connect(runner_config.link_config())
                .context("connecting to companion device")?;
            let mut session = TransportSession::new(tcp_link, runner_config.reconnect);
            engine.run(&mut source, &mut session, &stop)?
        };

        println!(
            "Offline run -> frames {}, commands sent {}, send failures {}, last command {}",
            summary.metrics.frames_processed,
            summary.metrics.commands_sent,
            summary.metrics.send_failures,
            summary
                .last_decision
                .map(|d| d.as_message())
                .unwrap_or("none")
        );

        let model = StatusModel {
            zone_masses: summary.last_masses,
            last_decision: summary.last_decision.map(|d| d.as_message().to_string()),
            metrics: summary.metrics,
        };
        bridge.publish(&model)?;
        bridge.publish_status("Offline guidance results ready.");

        write_report(&summary)?;
    }
    if args.serve {
        bridge.publish_status("Status bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}

fn write_report(summary: &LoopSummary) -> anyhow::Result<()> {
    let report = format!(
        "frames={} sent={} failures={} masses=({:.4},{:.4},{:.4})\n",
        summary.metrics.frames_processed,
        summary.metrics.commands_sent,
        summary.metrics.send_failures,
        summary.last_masses.left,
        summary.last_masses.center,
        summary.last_masses.right
    );
    let report_path = PathBuf::from("tools/data/offline_guidance.log");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(report_path)?;
    file.write_all(report.as_bytes())?;
    Ok(())
}

fn spawn_signal_watcher(stop: Arc<AtomicBool>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("signal-watcher".into())
        .spawn(move || {
            let runtime = match TokioBuilder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::warn!("signal watcher unavailable: {}", err);
                    return;
                }
            };
            if runtime.block_on(signal::ctrl_c()).is_ok() {
                stop.store(true, Ordering::Relaxed);
            }
        })
        .context("spawning signal watcher")?;
    Ok(())
}
