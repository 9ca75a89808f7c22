use control_room_core::wind::arrow_glyph;
use control_room_core::WindInfo;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, WhichUse, BRAILLE_SIX};

use crate::app::App;

pub fn render_wind(app: &mut App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Wind ")
        .title_style(Style::default().fg(Color::LightCyan))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(wind) = app.wind else {
        let throbber = Throbber::default()
            .label("Waiting for wind data...")
            .style(Style::default().fg(Color::Gray))
            .throbber_style(Style::default().fg(Color::LightCyan))
            .throbber_set(BRAILLE_SIX)
            .use_type(WhichUse::Spin);
        f.render_stateful_widget(throbber, inner, &mut app.throbber);
        return;
    };

    let [arrow_area, text_area] =
        Layout::horizontal([Constraint::Length(8), Constraint::Min(10)]).areas(inner);
    render_arrow(f, arrow_area, &wind);

    let updated = app
        .wind_updated
        .map_or_else(String::new, |at| format!("updated {}", at.format("%H:%M:%S")));
    f.render_widget(Paragraph::new(wind_lines(&wind, updated)), text_area);
}

fn wind_lines(wind: &WindInfo, updated: String) -> Vec<TextLine<'static>> {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let flow = wind.flow_angle();

    vec![
        TextLine::from(vec![
            Span::styled("Flow ", label),
            Span::styled(
                format!("{} {} ({flow:.0}°)", arrow_glyph(flow), wind.compass()),
                value.fg(Color::LightCyan),
            ),
        ]),
        TextLine::from(vec![
            Span::styled("Direction ", label),
            Span::styled(format!("{:.0}°", wind.wind_deg), value),
            Span::styled("  Speed ", label),
            Span::styled(format!("{:.1} m/s", wind.speed), value),
        ]),
        TextLine::from(Span::styled(updated, Style::default().fg(Color::DarkGray))),
    ]
}

/// Arrow rotated to the flow direction, drawn on a small canvas.
fn render_arrow(f: &mut Frame<'_>, area: Rect, wind: &WindInfo) {
    let (dx, dy) = wind.flow_vector();
    // Perpendicular, for the two barbs of the head.
    let (px, py) = (-dy, dx);

    f.render_widget(
        Canvas::default()
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0])
            .paint(move |ctx| {
                let tip = (dx * 0.9, dy * 0.9);
                ctx.draw(&CanvasLine {
                    x1: -dx * 0.9,
                    y1: -dy * 0.9,
                    x2: tip.0,
                    y2: tip.1,
                    color: Color::LightCyan,
                });
                for side in [-1.0, 1.0] {
                    ctx.draw(&CanvasLine {
                        x1: tip.0,
                        y1: tip.1,
                        x2: (px * side).mul_add(0.35, dx * 0.45),
                        y2: (py * side).mul_add(0.35, dy * 0.45),
                        color: Color::LightCyan,
                    });
                }
            }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_show_flow_direction_and_speed() {
        let wind = WindInfo {
            wind_deg: 270.0,
            speed: 5.25,
            flow_angle: None,
            vector: None,
        };
        let lines = wind_lines(&wind, String::new());
        let flow: String = lines[0].spans.iter().map(|span| span.content.as_ref()).collect();
        let detail: String = lines[1].spans.iter().map(|span| span.content.as_ref()).collect();

        assert_eq!(flow, "Flow → E (90°)");
        assert!(detail.contains("270°"));
        assert!(detail.contains("5.2 m/s") || detail.contains("5.3 m/s"));
    }
}
