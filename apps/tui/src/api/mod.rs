//! Typed client for the control room REST backend.

mod error;

pub use error::ApiError;

use control_room_core::{Incident, IncidentDraft, Vehicle, VehicleDraft, WindInfo};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::DEFAULT_REQUEST_TIMEOUT;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// HTTP client whose requests give up after `timeout`, connecting included.
pub fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|error| {
            warn!(%error, "cannot build HTTP client with timeouts, using defaults");
            Client::new()
        })
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_timeout(base, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(http_client(timeout), base)
    }

    fn with_client(http: Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { http, base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub async fn get_incidents(&self) -> Result<Vec<Incident>, ApiError> {
        self.get_json("/incidents").await
    }

    pub async fn get_incident(&self, id: i64) -> Result<Incident, ApiError> {
        self.get_json(&format!("/incidents/{id}")).await
    }

    /// Validates the draft first; a blank name never reaches the backend.
    pub async fn create_incident(&self, draft: &IncidentDraft) -> Result<Incident, ApiError> {
        let body = draft.validated()?;
        debug!(name = %body.name, status = body.status.as_str(), "creating incident");
        let response = self.http.post(self.url("/incidents")).json(&body).send().await?;
        decode(response).await
    }

    pub async fn update_incident(
        &self,
        id: i64,
        draft: &IncidentDraft,
    ) -> Result<Incident, ApiError> {
        let body = draft.validated()?;
        debug!(id, name = %body.name, "updating incident");
        let response = self
            .http
            .put(self.url(&format!("/incidents/{id}")))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_incident(&self, id: i64) -> Result<(), ApiError> {
        debug!(id, "deleting incident");
        let response = self
            .http
            .delete(self.url(&format!("/incidents/{id}")))
            .send()
            .await?;
        check(response).await.map(drop)
    }

    pub async fn get_vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.get_json("/vehicles").await
    }

    pub async fn get_vehicle(&self, id: i64) -> Result<Vehicle, ApiError> {
        self.get_json(&format!("/vehicles/{id}")).await
    }

    pub async fn create_vehicle(&self, draft: &VehicleDraft) -> Result<Vehicle, ApiError> {
        let body = draft.validated()?;
        debug!(name = %body.name, "creating vehicle");
        let response = self.http.post(self.url("/vehicles")).json(&body).send().await?;
        decode(response).await
    }

    pub async fn update_vehicle(&self, id: i64, draft: &VehicleDraft) -> Result<Vehicle, ApiError> {
        let body = draft.validated()?;
        debug!(id, name = %body.name, "updating vehicle");
        let response = self
            .http
            .put(self.url(&format!("/vehicles/{id}")))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_vehicle(&self, id: i64) -> Result<(), ApiError> {
        debug!(id, "deleting vehicle");
        let response = self
            .http
            .delete(self.url(&format!("/vehicles/{id}")))
            .send()
            .await?;
        check(response).await.map(drop)
    }

    pub async fn get_wind_info(&self) -> Result<WindInfo, ApiError> {
        self.get_json("/wind-info").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check(response).await?;
    Ok(response.json::<T>().await?)
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        },
        |body| body.error,
    );
    warn!(%status, %url, %message, "backend returned an error");
    Err(ApiError::Status { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use control_room_core::Location;

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = ApiClient::new("http://backend:5000/");
        assert_eq!(client.base(), "http://backend:5000");
        assert_eq!(client.url("/incidents"), "http://backend:5000/incidents");
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_a_request() {
        // Port 9 (discard) is never served here; a request would fail with Http.
        let client = ApiClient::new("http://127.0.0.1:9");
        let draft = IncidentDraft {
            name: String::new(),
            location: Location::new(0.5, 0.5),
            ..IncidentDraft::default()
        };

        let err = client.create_incident(&draft).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Incident name is required");
    }
}
