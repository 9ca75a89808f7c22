//! Background work and the UI loop.
//!
//! The UI loop owns the `App` and never waits on the network. Wind polling,
//! route requests and every backend call run as tokio tasks and report back
//! through an unbounded channel that the loop drains between frames.

mod loop_handler;

pub use loop_handler::{run, run_headless, HeadlessSnapshot};

use control_room_core::{Incident, RenderedRoute, RouteRequest, Vehicle, WindInfo};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::app::RecordKind;
use crate::routing::RoutingClient;

#[derive(Debug)]
pub enum AppEvent {
    WindUpdated(WindInfo),
    RouteResolved {
        generation: u64,
        route: RenderedRoute,
    },
    RecordsLoaded(Result<(Vec<Incident>, Vec<Vehicle>), ApiError>),
    /// A create (`edited: None`) or an update finished; carries the record id.
    Saved {
        kind: RecordKind,
        edited: Option<i64>,
        result: Result<i64, ApiError>,
    },
    Deleted {
        kind: RecordKind,
        id: i64,
        result: Result<(), ApiError>,
    },
    /// Outcome of the connectivity check: the number of vehicles received.
    BackendChecked(Result<usize, ApiError>),
}

pub type EventSender = UnboundedSender<AppEvent>;
pub type EventReceiver = UnboundedReceiver<AppEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Polls `/wind-info` right away and then on every tick. A failed poll keeps
/// the last reading on screen.
pub fn spawn_wind_poller(api: ApiClient, every: Duration, tx: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match api.get_wind_info().await {
                Ok(wind) => {
                    debug!(wind_deg = wind.wind_deg, speed = wind.speed, "wind updated");
                    if tx.send(AppEvent::WindUpdated(wind)).is_err() {
                        break;
                    }
                }
                Err(error) => warn!(%error, "wind poll failed"),
            }
        }
    })
}

/// Runs one backend call off the UI loop and sends whatever event it produces.
pub fn spawn_request<F>(tx: &EventSender, request: F)
where
    F: std::future::Future<Output = AppEvent> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        if tx.send(request.await).is_err() {
            debug!("UI loop gone, dropping backend result");
        }
    });
}

/// One task per route; each result comes back tagged with its generation.
pub fn spawn_route_requests(
    routing: &RoutingClient,
    generation: u64,
    requests: Vec<RouteRequest>,
    tx: &EventSender,
) {
    for request in requests {
        let routing = routing.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let route = routing.fetch(&request).await;
            let _ = tx.send(AppEvent::RouteResolved { generation, route });
        });
    }
}
