use control_room_core::geo::{Bounds, MapFrame};
use control_room_core::routing::Rgb;
use control_room_core::{GeoPoint, Marker, MarkerKind, RenderedRoute};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker as CanvasMarker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Rectangle};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::{App, Focus};

/// How close the crosshair must be to a marker to show its popup.
const POPUP_REACH_FRACTION: f64 = 0.04;

pub const fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

pub const fn marker_glyph(kind: MarkerKind) -> (&'static str, Color) {
    match kind {
        MarkerKind::Incident { .. } => ("▲", Color::Red),
        MarkerKind::Vehicle { .. } => ("■", Color::LightBlue),
        MarkerKind::SelectedIncident => ("◆", Color::Yellow),
        MarkerKind::SelectedVehicle => ("◆", Color::LightGreen),
    }
}

pub fn render_map(app: &mut App, f: &mut Frame<'_>, area: Rect) {
    let focused = app.focus == Focus::Map;
    let border = if app.assign_mode.is_active() {
        Color::Yellow
    } else if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .title(map_title(app))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    app.map_area = inner;

    let app = &*app;
    let bounds = app.viewport.bounds();
    let crosshair = app.viewport.unproject(app.crosshair.0, app.crosshair.1);
    let show_crosshair = focused || app.assign_mode.is_active();

    let canvas = Canvas::default()
        .block(block)
        .marker(CanvasMarker::Braille)
        .x_bounds([bounds.lng_min, bounds.lng_max])
        .y_bounds([bounds.lat_min, bounds.lat_max])
        .paint(|ctx| {
            draw_frame_outline(ctx, &app.config.map_frame);
            ctx.layer();

            for route in app.routes.routes() {
                draw_route(ctx, route, app.viewport.span_deg);
            }
            ctx.layer();

            for marker in app.markers.iter() {
                let (glyph, color) = marker_glyph(marker.kind);
                ctx.print(
                    marker.position.lng,
                    marker.position.lat,
                    TextLine::from(vec![
                        Span::styled(glyph, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                        Span::styled(
                            format!(" {}", marker.label),
                            Style::default().fg(Color::Gray),
                        ),
                    ]),
                );
            }

            for route in app.routes.routes() {
                if let (Some(label), Some(start)) = (route.distance_label(), route.path.first()) {
                    ctx.print(
                        start.lng,
                        start.lat,
                        Span::styled(label, Style::default().fg(rgb(route.color))),
                    );
                }
            }

            if show_crosshair {
                ctx.print(
                    crosshair.lng,
                    crosshair.lat,
                    Span::styled(
                        "+",
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });
    f.render_widget(canvas, area);

    if focused {
        if let Some(marker) = nearest_marker(app.markers.markers(), crosshair, &bounds) {
            render_marker_popup(f, inner, marker);
        }
    }
}

fn map_title(app: &App) -> TextLine<'static> {
    let mut spans = vec![Span::styled(
        " Map ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    let routes = &app.routes;
    let mode = if app.routing_active {
        format!("all routes ({}/{}) ", routes.routes().len(), routes.routes().len() + routes.pending())
    } else if app.selection.both().is_some() {
        "selected route ".to_string()
    } else {
        "routes off ".to_string()
    };
    spans.push(Span::styled(mode, Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("zoom {:.3}° ", app.viewport.span_deg),
        Style::default().fg(Color::DarkGray),
    ));
    TextLine::from(spans)
}

/// The normalized square, so the operator can see where `[0,1]²` ends.
fn draw_frame_outline(ctx: &mut Context<'_>, frame: &MapFrame) {
    let half = frame.span_deg / 2.0;
    ctx.draw(&Rectangle {
        x: frame.center.lng - half,
        y: frame.center.lat - half,
        width: frame.span_deg,
        height: frame.span_deg,
        color: Color::DarkGray,
    });
}

fn draw_route(ctx: &mut Context<'_>, route: &RenderedRoute, span_deg: f64) {
    let color = rgb(route.color);
    for (from, to) in route.strokes(span_deg) {
        ctx.draw(&CanvasLine {
            x1: from.lng,
            y1: from.lat,
            x2: to.lng,
            y2: to.lat,
            color,
        });
    }
}

/// Marker under the crosshair, if any is close enough.
pub fn nearest_marker<'a>(
    markers: &'a [Marker],
    point: GeoPoint,
    bounds: &Bounds,
) -> Option<&'a Marker> {
    let reach = (bounds.lng_max - bounds.lng_min) * POPUP_REACH_FRACTION;
    markers
        .iter()
        .map(|marker| {
            let distance =
                (marker.position.lng - point.lng).hypot(marker.position.lat - point.lat);
            (marker, distance)
        })
        .filter(|(_, distance)| *distance <= reach)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(marker, _)| marker)
}

fn render_marker_popup(f: &mut Frame<'_>, map: Rect, marker: &Marker) {
    let width = marker
        .popup
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        .saturating_add(4);
    let width = u16::try_from(width).unwrap_or(u16::MAX).min(map.width);
    let height = u16::try_from(marker.popup.len() + 2)
        .unwrap_or(u16::MAX)
        .min(map.height);
    let area = Rect {
        x: map.x,
        y: map.y + map.height.saturating_sub(height),
        width,
        height,
    };

    let lines: Vec<TextLine<'_>> = marker.popup.iter().map(|line| TextLine::from(line.as_str())).collect();
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(marker_glyph(marker.kind).1)),
        ),
        area,
    );
}
