use color_eyre::eyre::{eyre, WrapErr};
use control_room_core::geo::{GeoPoint, MapFrame, DEFAULT_CENTER};
use control_room_core::routing::DEFAULT_ROUTING_BASE;
use control_room_core::wind::WIND_POLL_INTERVAL;
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_FILE: &str = "control-room.log";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime settings, resolved from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub routing_base: String,
    pub wind_poll_interval: Duration,
    /// Upper bound for one backend or routing request.
    pub request_timeout: Duration,
    pub map_frame: MapFrame,
    pub log_file: PathBuf,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            routing_base: DEFAULT_ROUTING_BASE.to_string(),
            wind_poll_interval: WIND_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            map_frame: MapFrame::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            debug: false,
        }
    }
}

/// Initializes the application configuration
pub fn init_app_config() -> color_eyre::eyre::Result<AppConfig> {
    // Load environment variables from .env file
    dotenv().ok();

    config_from_lookup(|key| env::var(key).ok())
}

/// Builds the configuration from any key lookup; `init_app_config` feeds it the
/// process environment.
pub fn config_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> color_eyre::eyre::Result<AppConfig> {
    let defaults = AppConfig::default();

    let api_base = lookup("API_BASE")
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or(defaults.api_base);

    let routing_base = lookup("ROUTING_BASE")
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or(defaults.routing_base);

    let wind_poll_interval = parse_secs(lookup("WIND_POLL_SECS"), "WIND_POLL_SECS")?
        .unwrap_or(defaults.wind_poll_interval);
    let request_timeout = parse_secs(lookup("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS")?
        .unwrap_or(defaults.request_timeout);

    let lat = parse_coordinate(lookup("MAP_CENTER_LAT"), "MAP_CENTER_LAT", DEFAULT_CENTER.lat)?;
    let lng = parse_coordinate(lookup("MAP_CENTER_LNG"), "MAP_CENTER_LNG", DEFAULT_CENTER.lng)?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(eyre!("MAP_CENTER_LAT out of range: {lat}"));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(eyre!("MAP_CENTER_LNG out of range: {lng}"));
    }

    let log_file = lookup("LOG_FILE").map_or(defaults.log_file, PathBuf::from);
    let debug = lookup("DEBUG").is_some_and(|value| !matches!(value.trim(), "" | "0" | "false"));

    Ok(AppConfig {
        api_base,
        routing_base,
        wind_poll_interval,
        request_timeout,
        map_frame: MapFrame::with_center(GeoPoint::new(lat, lng)),
        log_file,
        debug,
    })
}

fn parse_secs(raw: Option<String>, key: &str) -> color_eyre::eyre::Result<Option<Duration>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .wrap_err_with(|| format!("{key} is not a number: {raw}"))?;
    if secs == 0 {
        return Err(eyre!("{key} must be at least 1"));
    }
    Ok(Some(Duration::from_secs(secs)))
}

fn parse_coordinate(
    raw: Option<String>,
    key: &str,
    default: f64,
) -> color_eyre::eyre::Result<f64> {
    raw.map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<f64>()
            .wrap_err_with(|| format!("{key} is not a number: {raw}"))
    })
}
