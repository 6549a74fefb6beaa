//! UI rendering module for Cinewatch
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. Rendering only reads `App`.

pub mod help_overlay;
pub mod movie_detail;
pub mod movie_list;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::app::App;
use crate::data::Movie;

pub use help_overlay::render as render_help_overlay;
pub use movie_detail::render as render_movie_detail;
pub use movie_list::render as render_movie_list;

/// Renders the main screen plus whichever overlay is open
pub fn render(frame: &mut Frame, app: &App) {
    render_movie_list(frame, app);
    if let Some(movie) = &app.active_movie {
        render_movie_detail(frame, app, movie);
    }
    if app.show_help {
        render_help_overlay(frame);
    }
}

/// "Title (YYYY)", or just the title when the date is unknown
pub(crate) fn movie_label(movie: &Movie) -> String {
    match movie.year() {
        Some(year) => format!("{} ({})", movie.title, year),
        None => movie.title.clone(),
    }
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
