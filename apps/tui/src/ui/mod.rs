// Rendering for the operator console

pub mod screens;
pub mod widgets;

use crate::app::App;
use ratatui::Frame;
use std::time::Duration;

pub fn ui(app: &mut App, f: &mut Frame<'_>, elapsed: Duration) {
    screens::dashboard::render_dashboard(app, f, elapsed);

    if app.show_help {
        let area = f.area();
        screens::help::render_help(f, area);
    }
}
