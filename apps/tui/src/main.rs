use clap::Parser;
use color_eyre::Result;
use control_room_tui::api::ApiClient;
use control_room_tui::app::App;
use control_room_tui::cli::CliArgs;
use control_room_tui::config::init_app_config;
use control_room_tui::{event, logging, terminal};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = init_app_config()?;

    // No terminal to draw on: print a snapshot instead
    if args.headless || args.json || !is_terminal() {
        logging::init_stderr_logging(config.debug);
        return event::run_headless(&config, args.json).await;
    }

    logging::init_file_logging(&config.log_file, config.debug)?;
    info!(api = %config.api_base, routing = %config.routing_base, "starting control room");

    let (tx, rx) = event::channel();
    let poller = event::spawn_wind_poller(
        ApiClient::with_timeout(config.api_base.clone(), config.request_timeout),
        config.wind_poll_interval,
        tx.clone(),
    );

    // Records arrive through the event channel once the loop is running
    let mut app = App::new(config, tx);
    app.refresh();

    let mut terminal = terminal::setup_terminal()?;
    let result = event::run(&mut terminal, &mut app, rx).await;
    terminal::cleanup_terminal_state(true, true);
    poller.abort();

    if let Err(err) = &result {
        error!(error = %err, "event loop failed");
    }
    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
