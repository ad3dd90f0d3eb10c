use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::theme::Theme;

fn key_line(key: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {key:<9}"),
            Style::default()
                .fg(Theme::selection_marker())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(description, Style::default().fg(Theme::text())),
    ])
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(Theme::highlight())
            .add_modifier(Modifier::BOLD),
    ))
}

pub fn build_help_text() -> Text<'static> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "Keyboard Shortcuts",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(section("Global Navigation"));
    lines.push(key_line("h", "Dashboard/Home"));
    lines.push(key_line("i", "Issues view"));
    lines.push(key_line("c", "Categories view"));
    lines.push(key_line("u", "Users view"));
    lines.push(key_line("q", "Quit application"));
    lines.push(key_line("?", "Toggle this help screen"));
    lines.push(Line::from(""));

    lines.push(section("Navigation"));
    lines.push(key_line("↑/↓", "Move selection up/down in lists"));
    lines.push(key_line("Enter", "Open/select item"));
    lines.push(key_line("Esc", "Go back to previous view"));
    lines.push(Line::from(""));

    lines.push(section("Issue Management"));
    lines.push(key_line("n", "Create new issue/category/user"));
    lines.push(key_line("s", "Set state of the selected issue"));
    lines.push(key_line("d", "Delete the selected issue (with history)"));
    lines.push(key_line("f", "Cycle the category filter"));
    lines.push(key_line("r", "Refresh current view"));
    lines.push(Line::from(""));

    lines.push(section("Search"));
    lines.push(key_line("/", "Search issues by description prefix"));
    lines.push(key_line("Enter", "Apply search filter"));
    lines.push(key_line("Esc", "Clear search filter"));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        "Tips",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(vec![
        Span::styled("  •", Style::default().fg(Theme::dim())),
        Span::styled(
            "  The dashboard shows resolving times for issues currently DONE",
            Style::default().fg(Theme::text()),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  •", Style::default().fg(Theme::dim())),
        Span::styled(
            "  Every state change is kept; an issue's history is never rewritten",
            Style::default().fg(Theme::text()),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  •", Style::default().fg(Theme::dim())),
        Span::styled(
            "  Use CLI commands for batch operations (trackr --help)",
            Style::default().fg(Theme::text()),
        ),
    ]));

    Text::from(lines)
}
