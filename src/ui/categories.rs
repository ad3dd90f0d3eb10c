use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::theme::Theme;
use crate::app::App;

pub fn build_categories_text(app: &App) -> Text<'_> {
    if let Some(status) = &app.status {
        return Text::from(status.as_str());
    }
    if app.categories_list.is_empty() {
        return Text::from("No categories found. Press 'n' to create one.");
    }

    let mut lines = app
        .categories_list
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let selected = index == app.selected_category_index;
            let marker_style = if selected {
                Style::default()
                    .fg(Theme::highlight())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Theme::dim())
            };
            Line::from(vec![
                Span::styled(if selected { "> " } else { "  " }, marker_style),
                Span::styled(category.name.as_str(), Style::default().fg(Theme::text())),
                Span::raw("  "),
                Span::styled(
                    category.created_at.format("%Y-%m-%d").to_string(),
                    Style::default().fg(Theme::dim()),
                ),
            ])
        })
        .collect::<Vec<_>>();

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "n: New category   esc: Back",
        Style::default().fg(Theme::dim()),
    )));

    Text::from(lines)
}
