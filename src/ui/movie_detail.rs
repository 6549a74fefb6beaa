//! Movie detail modal
//!
//! Renders a centered overlay for the selected movie. While the full record is
//! still resolving, the card's own fields are shown with a loading marker.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;
use crate::app::App;
use crate::data::normalize::NOT_AVAILABLE;
use crate::data::Movie;

const MODAL_WIDTH: u16 = 72;
const MODAL_HEIGHT: u16 = 20;

/// Renders the detail modal for `movie` on top of the current view
pub fn render(frame: &mut Frame, app: &App, movie: &Movie) {
    let area = centered_rect(MODAL_WIDTH, MODAL_HEIGHT, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", movie.title),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = build_lines(movie, app.detail_loading, app.is_favorite(&movie.id));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn build_lines(movie: &Movie, loading: bool, is_favorite: bool) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        label("Year"),
        value(movie.year().unwrap_or(NOT_AVAILABLE)),
        Span::raw("   "),
        label("Runtime"),
        value(movie.runtime.as_deref().unwrap_or(NOT_AVAILABLE)),
        Span::raw("   "),
        label("IMDB"),
        value(movie.rating.as_deref().unwrap_or(NOT_AVAILABLE)),
    ])];

    for (name, field) in [
        ("Genre", &movie.genre),
        ("Director", &movie.director),
        ("Actors", &movie.actors),
    ] {
        if let Some(text) = field {
            lines.push(Line::from(vec![label(name), value(text)]));
        }
    }

    lines.push(match &movie.poster_url {
        Some(url) => Line::from(vec![label("Poster"), value(url)]),
        None => Line::from(vec![
            label("Poster"),
            Span::styled("no poster", Style::default().fg(Color::DarkGray)),
        ]),
    });

    lines.push(Line::from(""));
    lines.push(Line::from(Span::raw(movie.overview.clone())));
    lines.push(Line::from(""));

    if loading {
        lines.push(Line::from(Span::styled(
            "Loading details...",
            Style::default().fg(Color::Cyan),
        )));
    }

    if is_favorite {
        lines.push(Line::from(Span::styled(
            "★ In My List",
            Style::default().fg(Color::Yellow),
        )));
    }

    let mut hints = vec![
        Span::styled("f", Style::default().fg(Color::Yellow)),
        Span::raw(if is_favorite {
            " Unfavorite  "
        } else {
            " Add to My List  "
        }),
    ];
    if is_favorite {
        hints.push(Span::styled("x", Style::default().fg(Color::Yellow)));
        hints.push(Span::raw(" Remove & close  "));
    }
    hints.push(Span::styled("Esc", Style::default().fg(Color::Yellow)));
    hints.push(Span::raw(" Close"));
    lines.push(Line::from(hints).style(Style::default().fg(Color::DarkGray)));

    lines
}

fn label(name: &str) -> Span<'static> {
    Span::styled(format!("{}: ", name), Style::default().fg(Color::Gray))
}

fn value(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().fg(Color::White))
}
