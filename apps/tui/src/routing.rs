use control_room_core::routing::OsrmResponse;
use control_room_core::{RenderedRoute, RouteRequest};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::http_client;
use crate::config::DEFAULT_REQUEST_TIMEOUT;

/// Talks to an OSRM-compatible routing service.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: Client,
    base: String,
}

impl RoutingClient {
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

    /// Fetches one route. Never fails: transport errors, bad payloads and
    /// `NoRoute` answers all come back as the straight-line fallback.
    pub async fn fetch(&self, request: &RouteRequest) -> RenderedRoute {
        let url = request.url(&self.base);
        debug!(%url, label = %request.label, "requesting route");

        let route = RenderedRoute::resolve(request, self.get(&url).await);
        if route.is_fallback() {
            warn!(label = %route.label, source = ?route.source, "routing failed, drawing straight line");
        }
        route
    }

    async fn get(&self, url: &str) -> Result<OsrmResponse, reqwest::Error> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<OsrmResponse>()
            .await
    }
}
