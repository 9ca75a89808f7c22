use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// First row to draw so that `selected` stays visible.
pub fn scroll_offset(total: usize, visible: usize, selected: usize) -> usize {
    if visible == 0 || total <= visible {
        return 0;
    }
    selected
        .saturating_sub(visible - 1)
        .min(total - visible)
}

/// Draws pre-built lines with a highlighted selection, scrolled to keep it in view.
pub fn render_rows(
    f: &mut Frame<'_>,
    area: Rect,
    lines: Vec<Line<'static>>,
    selected: usize,
    highlight: bool,
) {
    let visible = usize::from(area.height);
    let offset = scroll_offset(lines.len(), visible, selected);
    let selected_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let shown: Vec<Line<'static>> = lines
        .into_iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, line)| {
            if highlight && index == selected {
                line.style(selected_style)
            } else {
                line
            }
        })
        .collect();

    f.render_widget(Paragraph::new(shown), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lists_never_scroll() {
        assert_eq!(scroll_offset(3, 10, 2), 0);
        assert_eq!(scroll_offset(10, 0, 5), 0);
    }

    #[test]
    fn selection_stays_on_screen() {
        assert_eq!(scroll_offset(20, 5, 0), 0);
        assert_eq!(scroll_offset(20, 5, 4), 0);
        assert_eq!(scroll_offset(20, 5, 5), 1);
        assert_eq!(scroll_offset(20, 5, 19), 15);
    }
}
