mod categories;
mod dashboard;
mod detail;
mod help;
pub(crate) mod helpers;
mod issues;
mod theme;
mod users;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::app::{App, AppView, NewIssueField};
use crate::types::ALL_STATES;
use theme::Theme;

/// Renders the entire UI for a single frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let (title, body_text) = match app.view {
        AppView::Dashboard => (" Dashboard ", dashboard::build_dashboard_text(app)),
        AppView::Issues => (" Issues ", issues::build_issues_text(app)),
        AppView::IssueDetail => (" Issue ", detail::build_issue_detail_text(app)),
        AppView::Categories => (" Categories ", categories::build_categories_text(app)),
        AppView::Users => (" Users ", users::build_users_text(app)),
        AppView::Help => (" Help ", help::build_help_text()),
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let header_lines = vec![Line::from(vec![
        Span::styled(
            "  Trackr  ",
            Style::default().fg(Color::Black).bg(Theme::primary()),
        ),
        Span::raw(" "),
        Span::styled(
            "issue tracker",
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    let header = Paragraph::new(Text::from(header_lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(header, layout[0]);

    let mut body_lines = vec![
        tabs_line(app),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    body_lines.extend(body_text.lines);
    body_lines.push(Line::from(""));
    body_lines.push(Line::from(Span::styled(
        "----------------------------------------",
        Style::default().fg(Theme::dim()),
    )));
    body_lines.extend(keybinds_lines(app));
    let body = Paragraph::new(Text::from(body_lines))
        .style(Style::default().fg(Theme::text()))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(body, layout[1]);

    let footer = Paragraph::new(Text::from(status_line(app)))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(footer, layout[2]);

    if let Some(popup) = &app.new_issue_popup {
        render_new_issue_popup(frame, popup);
    }
    if let Some(popup) = &app.set_state_popup {
        render_set_state_popup(frame, popup);
    }
    if let Some(popup) = &app.new_category_popup {
        render_text_popup(frame, " New Category ", "Name: ", &popup.name);
    }
    if let Some(popup) = &app.new_user_popup {
        render_text_popup(frame, " New User ", "Username: ", &popup.username);
    }
    if let Some(popup) = &app.confirm_popup {
        render_confirm_popup(frame, popup);
    }
}

fn tabs_line(app: &App) -> Line<'_> {
    let tabs = [
        ("Home", AppView::Dashboard),
        ("Issues", AppView::Issues),
        ("Categories", AppView::Categories),
        ("Users", AppView::Users),
    ];

    let mut spans = Vec::new();
    for (index, (name, view)) in tabs.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        let active = match app.view {
            AppView::IssueDetail => *view == AppView::Issues,
            _ => *view == app.view,
        };
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::dim())
        };
        spans.push(Span::styled(format!(" {name} "), style));
    }

    Line::from(spans)
}

fn status_line(app: &App) -> Line<'_> {
    if let Some(status) = &app.status {
        return Line::from(Span::styled(
            status.as_str(),
            Style::default()
                .fg(Theme::state(crate::types::State::ToDo))
                .add_modifier(Modifier::BOLD),
        ));
    }
    if app.issues_search_active || !app.issues_search_query.is_empty() {
        return Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Theme::dim())),
            Span::styled(
                app.issues_search_query.as_str(),
                Style::default().fg(Theme::text()),
            ),
            Span::styled(
                if app.issues_search_active { "_" } else { "" },
                Style::default().fg(Theme::highlight()),
            ),
        ]);
    }
    let open: usize = app
        .state_counts
        .iter()
        .filter(|(state, _)| {
            matches!(
                state,
                crate::types::State::ToDo | crate::types::State::InProgress
            )
        })
        .map(|(_, count)| count)
        .sum();
    Line::from(vec![
        Span::styled("● ", Style::default().fg(Theme::selection_marker())),
        Span::styled(
            format!("{open} open issues"),
            Style::default().fg(Theme::dim()),
        ),
    ])
}

fn keybinds_lines(app: &App) -> Vec<Line<'static>> {
    let (primary, secondary) = match app.view {
        AppView::Dashboard => (
            "h: Home  i: Issues  c: Categories  u: Users",
            "r: Refresh  ?: Help  q: Quit",
        ),
        AppView::Issues => (
            "Up/Down: Select  Enter: Detail  n: New  s: Set state  d: Delete  f: Filter  /: Search",
            "r: Refresh  ?: Help  q: Quit",
        ),
        AppView::IssueDetail => (
            "s: Set state  d: Delete",
            "esc: Back  r: Refresh  ?: Help  q: Quit",
        ),
        AppView::Categories => ("Up/Down: Select  n: New", "esc: Back  ?: Help  q: Quit"),
        AppView::Users => ("Up/Down: Select  n: New", "esc: Back  ?: Help  q: Quit"),
        AppView::Help => ("Press ? or ESC to close this help screen", ""),
    };
    vec![
        Line::from(Span::styled(primary, Style::default().fg(Theme::dim()))),
        Line::from(Span::styled(secondary, Style::default().fg(Theme::dim()))),
    ]
}

fn render_new_issue_popup(frame: &mut Frame, popup: &crate::app::NewIssuePopup) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let arrow_style = Style::default()
        .fg(Theme::selection_marker())
        .add_modifier(Modifier::BOLD);
    let field_title = |active: bool| {
        if active {
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::dim())
        }
    };

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        "New issue",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    let title_active = popup.field == NewIssueField::Title;
    lines.push(Line::from(vec![
        Span::styled(if title_active { "> " } else { "  " }, arrow_style),
        Span::styled("Title: ", field_title(title_active)),
        Span::styled(popup.title.as_str(), Style::default().fg(Theme::text())),
    ]));
    let description_active = popup.field == NewIssueField::Description;
    lines.push(Line::from(vec![
        Span::styled(if description_active { "> " } else { "  " }, arrow_style),
        Span::styled("Description: ", field_title(description_active)),
        Span::styled(
            popup.description.as_str(),
            Style::default().fg(Theme::text()),
        ),
    ]));
    lines.push(Line::from(""));

    let category_active = popup.field == NewIssueField::Category;
    lines.push(Line::from(vec![
        Span::styled(if category_active { "> " } else { "  " }, arrow_style),
        Span::styled("Category: ", field_title(category_active)),
        Span::styled(
            popup
                .categories
                .get(popup.category_index)
                .map(|c| c.name.as_str())
                .unwrap_or("-"),
            Style::default().fg(Theme::text()),
        ),
    ]));
    let reporter_active = popup.field == NewIssueField::Reporter;
    lines.push(Line::from(vec![
        Span::styled(if reporter_active { "> " } else { "  " }, arrow_style),
        Span::styled("Reporter: ", field_title(reporter_active)),
        Span::styled(
            popup
                .users
                .get(popup.reporter_index)
                .map(|u| u.username.as_str())
                .unwrap_or("-"),
            Style::default().fg(Theme::text()),
        ),
    ]));
    let assignee_active = popup.field == NewIssueField::Assignee;
    lines.push(Line::from(vec![
        Span::styled(if assignee_active { "> " } else { "  " }, arrow_style),
        Span::styled("Assignee: ", field_title(assignee_active)),
        Span::styled(
            popup
                .users
                .get(popup.assignee_index)
                .map(|u| u.username.as_str())
                .unwrap_or("-"),
            Style::default().fg(Theme::text()),
        ),
    ]));

    let state_active = popup.field == NewIssueField::State;
    let state = ALL_STATES[popup.state_index];
    lines.push(Line::from(vec![
        Span::styled(if state_active { "> " } else { "  " }, arrow_style),
        Span::styled("State: ", field_title(state_active)),
        Span::styled(
            state.label(),
            Style::default()
                .fg(Theme::state(state))
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Type to edit. Tab: switch field. Up/Down: select. Enter: save. Esc: cancel.",
        Style::default().fg(Theme::dim()),
    )));

    let popup_widget = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary()))
                .title(" New Issue "),
        );
    frame.render_widget(popup_widget, area);
}

fn render_set_state_popup(frame: &mut Frame, popup: &crate::app::SetStatePopup) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(
            "Set state of ",
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            popup.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(""));
    for (index, state) in ALL_STATES.iter().enumerate() {
        let selected = index == popup.state_index;
        let marker_style = if selected {
            Style::default()
                .fg(Theme::selection_marker())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::dim())
        };
        let mut name_style = Style::default().fg(Theme::state(*state));
        if selected {
            name_style = name_style.add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(vec![
            Span::styled(if selected { "> " } else { "  " }, marker_style),
            Span::styled(state.label(), name_style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Up/Down: select. Enter: save. Esc: cancel.",
        Style::default().fg(Theme::dim()),
    )));

    let popup_widget = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary()))
                .title(" Set State "),
        );
    frame.render_widget(popup_widget, area);
}

fn render_text_popup(frame: &mut Frame, title: &str, label: &str, value: &str) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(vec![
            Span::styled(label.to_string(), Style::default().fg(Theme::dim())),
            Span::styled(value.to_string(), Style::default().fg(Theme::text())),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Type to edit. Enter: save. Esc: cancel.",
            Style::default().fg(Theme::dim()),
        )),
    ];

    let popup_widget = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary()))
                .title(title.to_string()),
        );
    frame.render_widget(popup_widget, area);
}

fn render_confirm_popup(frame: &mut Frame, popup: &crate::app::ConfirmDeletePopup) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        "Delete issue",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "Delete '{}' and its whole state history?",
            popup.title
        ),
        Style::default().fg(Theme::text()),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Press ", Style::default().fg(Theme::dim())),
        Span::styled(
            "Y",
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" to confirm or ", Style::default().fg(Theme::dim())),
        Span::styled(
            "N",
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("/", Style::default().fg(Theme::dim())),
        Span::styled(
            "ESC",
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" to cancel", Style::default().fg(Theme::dim())),
    ]));

    let popup_widget = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary()))
                .title(" Confirm "),
        );
    frame.render_widget(popup_widget, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
