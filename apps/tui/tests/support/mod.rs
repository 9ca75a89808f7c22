//! In-process stand-ins for the REST backend and the routing service.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use control_room_core::{Incident, IncidentDraft, Vehicle, VehicleDraft};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Failure = (StatusCode, Json<Value>);

fn not_found(what: &str) -> Failure {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{what} not found") })),
    )
}

#[derive(Default)]
pub struct Store {
    pub incidents: Vec<Incident>,
    pub vehicles: Vec<Vehicle>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct Backend {
    pub store: Arc<Mutex<Store>>,
    pub hits: Arc<AtomicUsize>,
}

impl Backend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

async fn list_incidents(State(backend): State<Backend>) -> Json<Vec<Incident>> {
    backend.hit();
    Json(backend.store.lock().unwrap().incidents.clone())
}

async fn create_incident(
    State(backend): State<Backend>,
    Json(draft): Json<IncidentDraft>,
) -> (StatusCode, Json<Incident>) {
    backend.hit();
    let mut store = backend.store.lock().unwrap();
    let incident = Incident {
        id: store.next_id(),
        name: draft.name,
        status: draft.status,
        location: draft.location,
    };
    store.incidents.push(incident.clone());
    (StatusCode::CREATED, Json(incident))
}

async fn get_incident(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
) -> Result<Json<Incident>, Failure> {
    backend.hit();
    let store = backend.store.lock().unwrap();
    store
        .incidents
        .iter()
        .find(|incident| incident.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Incident"))
}

async fn update_incident(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    Json(draft): Json<IncidentDraft>,
) -> Result<Json<Incident>, Failure> {
    backend.hit();
    let mut store = backend.store.lock().unwrap();
    let incident = store
        .incidents
        .iter_mut()
        .find(|incident| incident.id == id)
        .ok_or_else(|| not_found("Incident"))?;
    incident.name = draft.name;
    incident.status = draft.status;
    incident.location = draft.location;
    Ok(Json(incident.clone()))
}

async fn delete_incident(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Failure> {
    backend.hit();
    let mut store = backend.store.lock().unwrap();
    let before = store.incidents.len();
    store.incidents.retain(|incident| incident.id != id);
    if store.incidents.len() == before {
        return Err(not_found("Incident"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_vehicles(State(backend): State<Backend>) -> Json<Vec<Vehicle>> {
    backend.hit();
    Json(backend.store.lock().unwrap().vehicles.clone())
}

async fn create_vehicle(
    State(backend): State<Backend>,
    Json(draft): Json<VehicleDraft>,
) -> (StatusCode, Json<Vehicle>) {
    backend.hit();
    let mut store = backend.store.lock().unwrap();
    let vehicle = Vehicle {
        id: store.next_id(),
        name: draft.name,
        location: draft.location,
    };
    store.vehicles.push(vehicle.clone());
    (StatusCode::CREATED, Json(vehicle))
}

async fn get_vehicle(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
) -> Result<Json<Vehicle>, Failure> {
    backend.hit();
    let store = backend.store.lock().unwrap();
    store
        .vehicles
        .iter()
        .find(|vehicle| vehicle.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Vehicle"))
}

async fn update_vehicle(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    Json(draft): Json<VehicleDraft>,
) -> Result<Json<Vehicle>, Failure> {
    backend.hit();
    let mut store = backend.store.lock().unwrap();
    let vehicle = store
        .vehicles
        .iter_mut()
        .find(|vehicle| vehicle.id == id)
        .ok_or_else(|| not_found("Vehicle"))?;
    vehicle.name = draft.name;
    vehicle.location = draft.location;
    Ok(Json(vehicle.clone()))
}

async fn delete_vehicle(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Failure> {
    backend.hit();
    let mut store = backend.store.lock().unwrap();
    let before = store.vehicles.len();
    store.vehicles.retain(|vehicle| vehicle.id != id);
    if store.vehicles.len() == before {
        return Err(not_found("Vehicle"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn wind_info(State(backend): State<Backend>) -> Json<Value> {
    backend.hit();
    Json(json!({ "wind_deg": 270.0, "speed": 4.5 }))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Starts the fake backend; returns its base URL and a handle on its state.
pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let router = Router::new()
        .route("/incidents", get(list_incidents).post(create_incident))
        .route(
            "/incidents/{id}",
            get(get_incident).put(update_incident).delete(delete_incident),
        )
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/vehicles/{id}",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/wind-info", get(wind_info))
        .with_state(backend.clone());
    let addr = serve(router).await;
    (format!("http://{addr}"), backend)
}

/// Starts a routing service that answers every request with `body`.
pub async fn spawn_osrm(body: Value) -> String {
    let router = Router::new().route(
        "/route/v1/driving/{coords}",
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    let addr = serve(router).await;
    format!("http://{addr}")
}

/// Accepts connections and never answers; returns its base URL.
pub async fn spawn_silent() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}
