use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::cli::CliArgs;
use crate::ui::widgets::popup::centered_rect;

const SECTIONS: [(&str, &[(&str, &str)]); 3] = [
    (
        "Everywhere",
        &[
            ("Tab", "cycle map / incidents / vehicles"),
            ("i / v", "new incident / new vehicle"),
            ("r", "show or hide all routes"),
            ("R", "reset map"),
            ("t", "test backend"),
            ("F5", "refresh records"),
            ("F1", "toggle this help"),
            ("q", "quit"),
        ],
    ),
    (
        "Map",
        &[
            ("←↑↓→", "move crosshair (hover shows marker details)"),
            ("h j k l", "pan"),
            ("+ / -", "zoom in / out (mouse wheel too)"),
            ("Enter / click", "pick location while assigning"),
            ("Esc", "cancel assign (picked locations reset to 0,0)"),
        ],
    ),
    (
        "Panels",
        &[
            ("↑↓", "select row"),
            ("Enter", "expand/collapse section, edit record"),
            ("n", "create form"),
            ("a", "assign location from map"),
            ("d", "delete selected record"),
            ("/", "fuzzy filter by name"),
            ("Esc", "leave form or filter"),
        ],
    ),
];

pub fn render_help(f: &mut Frame<'_>, area: Rect) {
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Help (F1/Esc to close) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(
        Paragraph::new(help_lines()).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}

fn section_title(title: &str) -> TextLine<'_> {
    TextLine::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn help_lines() -> Vec<TextLine<'static>> {
    let mut lines = Vec::new();
    for (title, keys) in SECTIONS {
        lines.push(section_title(title));
        for (key, action) in keys {
            lines.push(TextLine::from(vec![
                Span::styled(format!("  {key:<14}"), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ]));
        }
        lines.push(TextLine::from(""));
    }

    lines.push(section_title("Command line"));
    lines.extend(
        CliArgs::help_text()
            .lines()
            .map(|line| TextLine::from(format!("  {line}"))),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[TextLine<'_>]) -> String {
        lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn help_lists_keys_and_command_line_flags() {
        let text = plain(&help_lines());
        assert!(text.contains("toggle this help"));
        assert!(text.contains("Command line"));
        assert!(text.contains("--api-base"));
        assert!(text.contains("--headless"));
    }
}
