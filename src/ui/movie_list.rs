//! Main screen rendering
//!
//! Renders the collection header, the query bar, the three horizontal rows
//! (2025 releases, recently viewed, recommended), the paged result list and
//! the filter status line.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::movie_label;
use crate::app::{App, InputMode, Section};
use crate::data::Movie;

/// Renders the main screen
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state containing collections and selection
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Query bar
            Constraint::Length(5), // Rows
            Constraint::Min(3),    // Results
            Constraint::Length(1), // Filters
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_query_bar(frame, app, chunks[1]);
    render_rows(frame, app, chunks[2]);
    render_results(frame, app, chunks[3]);
    render_filters(frame, app, chunks[4]);
    render_key_hints(frame, chunks[5]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (name, overview) = match &app.collection {
        Some(collection) => (collection.name.clone(), collection.overview.clone()),
        None => ("Loading...".to_string(), String::new()),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                "CINEWATCH",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(name, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(overview, Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            "─".repeat(area.width.saturating_sub(2) as usize),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_query_bar(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let content = if editing {
        Line::from(vec![
            Span::raw(app.pending_query.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ])
    } else if app.view.query.is_empty() {
        Line::from(Span::styled(
            "Press / to search by title",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(Span::raw(app.view.query.clone()))
    };

    let border = if editing { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_rows(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = [Section::Releases, Section::Recent, Section::Recommended]
        .into_iter()
        .map(|section| row_line(app, section))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// One horizontal row: its title followed by the card titles
fn row_line(app: &App, section: Section) -> Line<'static> {
    let active = app.section == section;
    let title_style = if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut spans = vec![Span::styled(format!("{:<17}", section.title()), title_style)];
    let items = app.items(section);
    if items.is_empty() {
        spans.push(Span::styled("--", Style::default().fg(Color::DarkGray)));
    }
    for (index, movie) in items.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" · ", Style::default().fg(Color::DarkGray)));
        }
        let style = if active && index == app.selected_index {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(movie.title.clone(), style));
    }
    Line::from(spans)
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.view.show_my_list {
        format!(" My List ({}) ", app.library().favorites().len())
    } else {
        format!(" Movies ({}) ", app.visible_all().len())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let items = app.items(Section::Results);
    let mut lines: Vec<Line> = Vec::with_capacity(items.len() + 2);

    if app.is_loading() && !app.view.show_my_list {
        lines.push(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Cyan),
        )));
    } else if items.is_empty() {
        let message = if app.view.show_my_list {
            "Your list is empty. Press f on a movie to add it."
        } else {
            "No results."
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        )));
    }

    let results_active = app.section == Section::Results;
    let first_item_line = lines.len();
    for (index, movie) in items.iter().enumerate() {
        let is_selected = results_active && index == app.selected_index;
        lines.push(result_line(movie, is_selected, app.is_favorite(&movie.id)));
    }

    if !app.view.show_my_list && app.has_more() {
        lines.push(Line::from(vec![
            Span::styled("  n", Style::default().fg(Color::Yellow)),
            Span::styled(" Load more", Style::default().fg(Color::DarkGray)),
        ]));
    }

    // Keep the selected card inside the visible window
    let offset = if results_active {
        scroll_offset(first_item_line + app.selected_index, area.height.saturating_sub(2))
    } else {
        0
    };

    frame.render_widget(Paragraph::new(lines).block(block).scroll((offset, 0)), area);
}

/// First visible line so that `selected_line` fits in `visible_lines`
fn scroll_offset(selected_line: usize, visible_lines: u16) -> u16 {
    let visible = usize::from(visible_lines.max(1));
    let offset = (selected_line + 1).saturating_sub(visible);
    u16::try_from(offset).unwrap_or(u16::MAX)
}

/// Format: " ▸ Title (YYYY)            ★  Overview"
fn result_line(movie: &Movie, is_selected: bool, is_favorite: bool) -> Line<'static> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " };
    let name_style = if is_selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    Line::from(vec![
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{:<36}", movie_label(movie)), name_style),
        Span::styled(
            if is_favorite { " ★ " } else { "   " },
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(movie.overview.clone(), Style::default().fg(Color::DarkGray)),
    ])
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let year = app.view.year_filter.as_deref().unwrap_or("All");
    let mock = if app.view.force_mock { "ON" } else { "off" };

    let line = Line::from(vec![
        Span::styled(" Year: ", Style::default().fg(Color::Gray)),
        Span::styled(year.to_string(), Style::default().fg(Color::White)),
        Span::styled("  Sort: ", Style::default().fg(Color::Gray)),
        Span::styled(app.view.sort_by.label(), Style::default().fg(Color::White)),
        Span::styled("  Force Mock: ", Style::default().fg(Color::Gray)),
        Span::styled(
            mock,
            Style::default().fg(if app.view.force_mock {
                Color::Yellow
            } else {
                Color::White
            }),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
}

fn render_key_hints(frame: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("/", Style::default().fg(Color::Yellow)),
        Span::raw(" Search  "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Open  "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Rows  "),
        Span::styled("y/s", Style::default().fg(Color::Yellow)),
        Span::raw(" Year/Sort  "),
        Span::styled("l", Style::default().fg(Color::Yellow)),
        Span::raw(" My List  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);

    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
