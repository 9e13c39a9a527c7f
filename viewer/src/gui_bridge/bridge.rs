use crate::gui_bridge::model::ViewerModel;
use crate::workflow::config::DisplayOptions;
use crate::workflow::runner::Runner;
use ecgcore::record::WaveformRecord;
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter, Rejection, Reply};

type SharedModel = Arc<RwLock<ViewerModel>>;

fn snapshot_of(state: &SharedModel) -> ViewerModel {
    match state.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn replace(state: &SharedModel, model: ViewerModel) {
    match state.write() {
        Ok(mut guard) => *guard = model,
        Err(poisoned) => *poisoned.into_inner() = model,
    }
}

/// Hosts the rendering hand-off: the latest layout and annotations as JSON,
/// plus an endpoint that opens a posted record.
pub struct GuiBridge {
    state: SharedModel,
    runner: Arc<Runner>,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ViewerModel::default())),
            runner,
        }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let runner = self.runner.clone();
        let runner_filter = warp::any().map(move || runner.clone());

        let layout_route = warp::path("layout")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: SharedModel| warp::reply::json(&snapshot_of(&state).layout));

        let annotations_route = warp::path("annotations")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: SharedModel| warp::reply::json(&snapshot_of(&state).annotations));

        let open_route = warp::path("open")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .map(|record: WaveformRecord, state: SharedModel, runner: Arc<Runner>| {
                let display = DisplayOptions::from_config(runner.config());
                match runner.execute(&record, &display, &[]) {
                    Ok(report) => {
                        let channels = report.summary.channels;
                        replace(&state, report.model);
                        info!("[GUI] opened posted record with {} channels", channels);
                        warp::reply::with_status(
                            warp::reply::json(&json!({"status": "ok", "channels": channels})),
                            StatusCode::OK,
                        )
                    }
                    Err(err) => {
                        error!("[GUI] open error: {:#}", err);
                        warp::reply::with_status(
                            warp::reply::json(&json!({
                                "status": "error",
                                "message": format!("{:#}", err)
                            })),
                            StatusCode::UNPROCESSABLE_ENTITY,
                        )
                    }
                }
            });

        layout_route.or(annotations_route).or(open_route)
    }

    /// Serves the routes on a background thread.
    pub fn serve(&self, address: SocketAddr) {
        let routes = self.routes();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("[GUI] failed to build runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });
    }

    pub fn publish(&self, model: &ViewerModel) {
        replace(&self.state, model.clone());
        info!(
            "[GUI] placements: {}, measures: {}",
            model.layout.placements.len(),
            model.annotations.measures.len()
        );
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> ViewerModel {
        snapshot_of(&self.state)
    }
}
