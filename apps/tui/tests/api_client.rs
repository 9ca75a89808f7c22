mod support;

use approx::assert_relative_eq;
use control_room_core::{IncidentDraft, IncidentStatus, Location, VehicleDraft};
use control_room_tui::api::{ApiClient, ApiError};
use reqwest::StatusCode;
use std::time::Duration;

#[tokio::test]
async fn incident_crud_round_trip() {
    let (base, _backend) = support::spawn_backend().await;
    let api = ApiClient::new(format!("{base}/"));

    let created = api
        .create_incident(&IncidentDraft {
            name: "Warehouse fire".to_string(),
            status: IncidentStatus::Pending,
            location: Location::new(0.25, 0.75),
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Warehouse fire");
    assert!(created.is_pending());

    let updated = api
        .update_incident(
            created.id,
            &IncidentDraft {
                name: "Warehouse fire".to_string(),
                status: IncidentStatus::Resolved,
                location: created.location,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, IncidentStatus::Resolved);

    let fetched = api.get_incident(created.id).await.unwrap();
    assert_eq!(fetched, updated);
    assert_eq!(api.get_incidents().await.unwrap().len(), 1);

    api.delete_incident(created.id).await.unwrap();
    assert!(api.get_incidents().await.unwrap().is_empty());
}

#[tokio::test]
async fn vehicle_crud_round_trip() {
    let (base, _backend) = support::spawn_backend().await;
    let api = ApiClient::new(base);

    let created = api
        .create_vehicle(&VehicleDraft {
            name: "Ambulance 1".to_string(),
            location: Location::new(0.1, 0.2),
        })
        .await
        .unwrap();

    let moved = api
        .update_vehicle(
            created.id,
            &VehicleDraft {
                name: "Ambulance 1".to_string(),
                location: Location::new(0.6, 0.4),
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.location, Location::new(0.6, 0.4));
    assert_eq!(api.get_vehicle(created.id).await.unwrap(), moved);

    api.delete_vehicle(created.id).await.unwrap();
    assert!(api.get_vehicles().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_record_maps_error_body() {
    let (base, _backend) = support::spawn_backend().await;
    let api = ApiClient::new(base);

    let err = api.get_incident(42).await.unwrap_err();
    match &err {
        ApiError::Status { status, message } => {
            assert_eq!(*status, StatusCode::NOT_FOUND);
            assert_eq!(message, "Incident not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "Incident not found");

    let err = api.delete_vehicle(7).await.unwrap_err();
    assert_eq!(err.user_message(), "Vehicle not found");
}

#[tokio::test]
async fn blank_names_never_reach_the_backend() {
    let (base, backend) = support::spawn_backend().await;
    let api = ApiClient::new(base);

    let err = api
        .create_vehicle(&VehicleDraft {
            name: "   ".to_string(),
            location: Location::default(),
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.user_message(), "Vehicle name is required");

    let err = api
        .update_incident(1, &IncidentDraft::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn wind_info_derives_flow_angle() {
    let (base, _backend) = support::spawn_backend().await;
    let api = ApiClient::new(base);

    let wind = api.get_wind_info().await.unwrap();
    assert_relative_eq!(wind.wind_deg, 270.0);
    assert_relative_eq!(wind.flow_angle(), 90.0);
    assert_eq!(wind.compass(), "E");
}

#[tokio::test]
async fn unreachable_backend_reads_as_such() {
    let api = ApiClient::new("http://127.0.0.1:9");
    let err = api.get_vehicles().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
    assert_eq!(err.user_message(), "backend unreachable");
}

#[tokio::test]
async fn silent_backend_times_out() {
    let base = support::spawn_silent().await;
    let api = ApiClient::with_timeout(base, Duration::from_millis(200));

    let err = tokio::time::timeout(Duration::from_secs(5), api.get_incidents())
        .await
        .expect("request outlived its timeout")
        .unwrap_err();
    assert!(matches!(&err, ApiError::Http(inner) if inner.is_timeout()));
    assert_eq!(err.user_message(), "backend timed out");
}
