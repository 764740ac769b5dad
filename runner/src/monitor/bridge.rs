use crate::monitor::model::StatusModel;
use crate::workflow::runner::GuidanceLoop;
use anyhow::Result;
use guidecore::detector_interface::FrameOutput;
use guidecore::pipeline::decide;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

fn monitor_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9300))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

/// Bridge that hosts the status HTTP endpoint and evaluates probe frames.
///
/// `GET /status` serves the latest published [`StatusModel`]; `POST /frame`
/// runs one detector output through the pipeline for remote debugging.
pub struct MonitorBridge {
    state: Arc<RwLock<StatusModel>>,
}

impl MonitorBridge {
    pub fn new(engine: Arc<GuidanceLoop>) -> Self {
        let state = Arc::new(RwLock::new(StatusModel::default()));
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let engine_filter = warp::any().map(move || engine.clone());

        let status_route = warp::path("status")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<StatusModel>>| warp::reply::json(&*state.read().unwrap()));

        let frame_route = warp::path("frame")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(engine_filter)
            .and_then(
                |frame: FrameOutput,
                 state: Arc<RwLock<StatusModel>>,
                 engine: Arc<GuidanceLoop>| async move {
                    match engine.evaluate_frame(frame) {
                        Ok(masses) => {
                            let decision = decide(&masses);
                            let mut guard = state.write().unwrap();
                            guard.zone_masses = masses;
                            guard.last_decision = Some(decision.as_message().to_string());
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "ok",
                                    "decision": decision.as_message()
                                })),
                                StatusCode::OK,
                            ))
                        }
                        Err(err) => {
                            eprintln!("frame probe error: {}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = status_route.or(frame_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(monitor_bind_address()).await;
            });
        });

        Self { state }
    }

    pub fn publish(&self, model: &StatusModel) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        *guard = model.clone();
        println!(
            "[monitor] masses L {:.4} C {:.4} R {:.4}, last command: {}",
            guard.zone_masses.left,
            guard.zone_masses.center,
            guard.zone_masses.right,
            guard.last_decision.as_deref().unwrap_or("none")
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[monitor] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> StatusModel {
        self.state.read().unwrap().clone()
    }
}
