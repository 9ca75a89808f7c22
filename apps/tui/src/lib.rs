// Modules shared by the binary and the integration tests
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod event;
pub mod logging;
pub mod routing;
pub mod terminal;
pub mod ui;
