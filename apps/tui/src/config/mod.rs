#[allow(clippy::module_inception)]
mod config;

pub use config::{
    config_from_lookup, init_app_config, AppConfig, DEFAULT_API_BASE, DEFAULT_LOG_FILE,
    DEFAULT_REQUEST_TIMEOUT,
};
