//! Application state management for Cinewatch
//!
//! This module contains the view state controller: the active query, filters,
//! pagination, favorites and modal target, plus keyboard handling. It never
//! performs I/O itself. Work is queued as `LoadRequest`s for the main loop to
//! dispatch, and results come back through `App::apply`, which drops anything
//! issued for a query, row or card that has since been superseded.

use std::cmp::Ordering;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::cli::StartupConfig;
use crate::collections::{CollectionOrigin, PAGE_SIZE, RECOMMENDED_LIMIT};
use crate::data::{mock_movies, Collection, Movie};
use crate::library::Library;
use crate::loader::{LoadMessage, LoadRequest};

/// Sort order applied to the visible list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Keep the collection's order
    #[default]
    Default,
    /// Release date, latest first
    Newest,
    /// Release date, earliest first
    Oldest,
    /// Title, A to Z
    Title,
}

impl SortBy {
    /// Parses a sort name, case-insensitively
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" => Some(SortBy::Default),
            "newest" => Some(SortBy::Newest),
            "oldest" => Some(SortBy::Oldest),
            "title" => Some(SortBy::Title),
            _ => None,
        }
    }

    /// Next sort order in the cycle
    pub fn next(self) -> Self {
        match self {
            SortBy::Default => SortBy::Newest,
            SortBy::Newest => SortBy::Oldest,
            SortBy::Oldest => SortBy::Title,
            SortBy::Title => SortBy::Default,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortBy::Default => "Default",
            SortBy::Newest => "Newest",
            SortBy::Oldest => "Oldest",
            SortBy::Title => "Title (A-Z)",
        }
    }

    fn compare(self, a: &Movie, b: &Movie) -> Ordering {
        match self {
            SortBy::Default => Ordering::Equal,
            SortBy::Newest => b.release_date.cmp(&a.release_date),
            SortBy::Oldest => a.release_date.cmp(&b.release_date),
            SortBy::Title => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
        }
    }
}

/// Rows of cards the selection can move between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Main search results (or favorites in My List mode)
    Results,
    /// 2025 releases row
    Releases,
    /// Recently viewed row
    Recent,
    /// Recommended row
    Recommended,
}

impl Section {
    pub fn next(self) -> Self {
        match self {
            Section::Results => Section::Releases,
            Section::Releases => Section::Recent,
            Section::Recent => Section::Recommended,
            Section::Recommended => Section::Results,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Section::Results => Section::Recommended,
            Section::Releases => Section::Results,
            Section::Recent => Section::Releases,
            Section::Recommended => Section::Recent,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Results => "Movies",
            Section::Releases => "2025 Releases",
            Section::Recent => "Recently viewed",
            Section::Recommended => "Recommended",
        }
    }
}

/// UI-facing query, filter and pagination state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Last submitted query
    pub query: String,
    /// Year prefix to keep; `None` shows all years
    pub year_filter: Option<String>,
    pub sort_by: SortBy,
    /// Skip the network for searches
    pub force_mock: bool,
    /// Show favorites instead of search results
    pub show_my_list: bool,
    /// Number of pages shown, starting at 1
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            query: String::new(),
            year_filter: None,
            sort_by: SortBy::Default,
            force_mock: false,
            show_my_list: false,
            page: 1,
        }
    }
}

/// Whether keystrokes edit the query or drive navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Counters identifying the latest request of each supersedable kind
#[derive(Debug, Clone, Copy, Default)]
struct Generations {
    search: u64,
    recent: u64,
    detail: u64,
}

/// Filters `movies` by year prefix and sorts them; sorting is stable
pub fn filter_and_sort<'a>(movies: &'a [Movie], year: Option<&str>, sort_by: SortBy) -> Vec<&'a Movie> {
    let mut visible: Vec<&Movie> = movies
        .iter()
        .filter(|m| year.map_or(true, |y| m.release_date.starts_with(y)))
        .collect();
    if sort_by != SortBy::Default {
        visible.sort_by(|a, b| sort_by.compare(a, b));
    }
    visible
}

/// Main application struct managing state and data
#[derive(Debug)]
pub struct App {
    pub view: ViewState,
    pub input_mode: InputMode,
    /// Query text being edited, submitted on Enter
    pub pending_query: String,
    /// Current collection; `None` while a search is loading
    pub collection: Option<Collection>,
    pub recommended: Vec<Movie>,
    pub releases: Vec<Movie>,
    pub recent_movies: Vec<Movie>,
    /// Movie shown in the detail modal
    pub active_movie: Option<Movie>,
    /// The modal shows a stub while its full record is resolving
    pub detail_loading: bool,
    pub section: Section,
    pub selected_index: usize,
    pub show_help: bool,
    pub should_quit: bool,
    library: Library,
    generations: Generations,
    requests: Vec<LoadRequest>,
}

impl App {
    /// Creates the application and queues the startup loads
    pub fn new(library: Library, config: &StartupConfig) -> Self {
        let mut app = Self {
            view: ViewState {
                query: config.initial_query.clone().unwrap_or_default(),
                year_filter: config.year_filter.clone(),
                sort_by: config.sort_by,
                force_mock: config.force_mock,
                ..ViewState::default()
            },
            input_mode: InputMode::Normal,
            pending_query: String::new(),
            collection: None,
            recommended: mock_movies().into_iter().take(RECOMMENDED_LIMIT).collect(),
            releases: Vec::new(),
            recent_movies: Vec::new(),
            active_movie: None,
            detail_loading: false,
            section: Section::Results,
            selected_index: 0,
            show_help: false,
            should_quit: false,
            library,
            generations: Generations::default(),
            requests: Vec::new(),
        };

        app.requests.push(LoadRequest::Releases);
        app.start_search();
        if !app.library.recent_searches().is_empty() {
            app.refresh_recent();
        }
        app
    }

    /// Drains the loads queued since the last call
    pub fn take_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn is_loading(&self) -> bool {
        self.collection.is_none()
    }

    /// Replaces the query and starts a fresh search; blank input is ignored
    pub fn submit_query(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.view.query = query.to_string();
        self.start_search();
    }

    /// Starts a search for the current query, superseding any in flight
    fn start_search(&mut self) {
        self.generations.search += 1;
        self.collection = None;
        self.requests.push(LoadRequest::Search {
            generation: self.generations.search,
            query: self.view.query.clone(),
            force_mock: self.view.force_mock,
        });
    }

    /// Rebuilds the recently-viewed row from the recent search terms
    fn refresh_recent(&mut self) {
        self.generations.recent += 1;
        self.requests.push(LoadRequest::Recent {
            generation: self.generations.recent,
            terms: self.library.recent_searches().as_slice().to_vec(),
        });
    }

    fn record_recent_search(&mut self, term: &str) {
        if self.library.push_recent_search(term) {
            self.refresh_recent();
        }
    }

    /// Applies a load result unless it belongs to a superseded request
    pub fn apply(&mut self, message: LoadMessage) {
        match message {
            LoadMessage::SearchCompleted {
                generation,
                query,
                outcome,
            } => {
                if generation != self.generations.search {
                    debug!(generation, query = query.as_str(), "discarding stale search result");
                    return;
                }
                self.collection = Some(outcome.collection);
                self.view.page = 1;
                if self.section == Section::Results {
                    self.selected_index = 0;
                }
                if outcome.origin == CollectionOrigin::Omdb {
                    self.record_recent_search(&query);
                    self.requests.push(LoadRequest::Recommended { generation, query });
                }
            }
            LoadMessage::RecommendedReady { generation, movies } => {
                if generation != self.generations.search {
                    debug!(generation, "discarding stale recommendations");
                    return;
                }
                if !movies.is_empty() {
                    self.recommended = movies.into_iter().take(RECOMMENDED_LIMIT).collect();
                    self.clamp_selection();
                }
            }
            LoadMessage::ReleasesReady(movies) => {
                self.releases = movies;
                self.clamp_selection();
            }
            LoadMessage::RecentReady { generation, movies } => {
                if generation != self.generations.recent {
                    debug!(generation, "discarding stale recently-viewed row");
                    return;
                }
                self.recent_movies = movies;
                self.clamp_selection();
            }
            LoadMessage::DetailResolved { generation, movie } => {
                if generation != self.generations.detail || self.active_movie.is_none() {
                    debug!(generation, "discarding stale detail");
                    return;
                }
                self.active_movie = Some(movie);
                self.detail_loading = false;
            }
        }
    }

    /// Search results after the year filter and sort
    pub fn visible_all(&self) -> Vec<&Movie> {
        let parts = self
            .collection
            .as_ref()
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[]);
        filter_and_sort(parts, self.view.year_filter.as_deref(), self.view.sort_by)
    }

    /// Visible results truncated to the loaded pages
    pub fn visible_page(&self) -> Vec<&Movie> {
        let mut visible = self.visible_all();
        visible.truncate(self.view.page * PAGE_SIZE);
        visible
    }

    /// Whether "load more" would reveal more results
    pub fn has_more(&self) -> bool {
        self.visible_all().len() > self.view.page * PAGE_SIZE
    }

    pub fn load_more(&mut self) {
        if self.has_more() {
            self.view.page += 1;
        }
    }

    /// Distinct release years of the current collection, newest first
    pub fn available_years(&self) -> Vec<String> {
        let mut years: Vec<String> = self
            .collection
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|m| m.year())
            .map(str::to_string)
            .collect();
        years.sort_by(|a, b| b.cmp(a));
        years.dedup();
        years
    }

    /// Steps the year filter through "all" and each available year
    pub fn cycle_year_filter(&mut self) {
        let years = self.available_years();
        self.view.year_filter = match &self.view.year_filter {
            None => years.first().cloned(),
            Some(current) => years
                .iter()
                .position(|y| y == current)
                .and_then(|i| years.get(i + 1))
                .cloned(),
        };
        self.clamp_selection();
    }

    pub fn cycle_sort(&mut self) {
        self.view.sort_by = self.view.sort_by.next();
    }

    /// Toggles force-mock and re-runs the search
    pub fn toggle_force_mock(&mut self) {
        self.view.force_mock = !self.view.force_mock;
        self.start_search();
    }

    /// Resets year, sort and force-mock
    pub fn clear_filters(&mut self) {
        self.view.year_filter = None;
        self.view.sort_by = SortBy::Default;
        if self.view.force_mock {
            self.view.force_mock = false;
            self.start_search();
        }
        self.clamp_selection();
    }

    pub fn toggle_my_list(&mut self) {
        self.view.show_my_list = !self.view.show_my_list;
        self.section = Section::Results;
        self.selected_index = 0;
    }

    /// Adds or removes a favorite; returns whether it is a favorite afterwards
    pub fn toggle_favorite(&mut self, movie: &Movie) -> bool {
        let now_favorite = self.library.toggle_favorite(movie);
        self.clamp_selection();
        now_favorite
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.library.is_favorite(id)
    }

    /// Cards of the given section in display order
    pub fn items(&self, section: Section) -> Vec<&Movie> {
        match section {
            Section::Results if self.view.show_my_list => {
                self.library.favorites().as_slice().iter().collect()
            }
            Section::Results => self.visible_page(),
            Section::Releases => self.releases.iter().collect(),
            Section::Recent => self.recent_movies.iter().collect(),
            Section::Recommended => self.recommended.iter().collect(),
        }
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.items(self.section).get(self.selected_index).copied()
    }

    /// Opens the detail modal for `movie`.
    ///
    /// A card that already embeds its full record is shown as is; otherwise
    /// the card is shown while its record resolves. The title is recorded as
    /// a recent search either way.
    pub fn select_movie(&mut self, movie: Movie) {
        self.generations.detail += 1;
        let term = if movie.title.is_empty() {
            movie.id.clone()
        } else {
            movie.title.clone()
        };

        self.detail_loading = !movie.has_detail();
        if self.detail_loading {
            self.requests.push(LoadRequest::Detail {
                generation: self.generations.detail,
                movie: movie.clone(),
                force_mock: self.view.force_mock,
            });
        }
        self.active_movie = Some(movie);
        self.record_recent_search(&term);
    }

    /// Closes the modal; a resolution still in flight is discarded on arrival
    pub fn close_detail(&mut self) {
        self.generations.detail += 1;
        self.active_movie = None;
        self.detail_loading = false;
    }

    fn clamp_selection(&mut self) {
        let count = self.items(self.section).len();
        if count == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }

    /// Moves the selection up, wrapping to the bottom
    fn move_selection_up(&mut self) {
        let count = self.items(self.section).len();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down, wrapping to the top
    fn move_selection_down(&mut self) {
        let count = self.items(self.section).len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }

    fn switch_section(&mut self, section: Section) {
        self.section = section;
        self.selected_index = 0;
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `/`: Edit the query (`Enter` submits, `Esc` cancels)
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - `Tab`/`BackTab`: Switch between result list and rows
    /// - `Enter`: Open the selected movie
    /// - `y`/`s`: Cycle year filter / sort order
    /// - `m`: Toggle force mock, `c`: Clear filters
    /// - `l`: Toggle My List, `f`: Toggle favorite, `n`: Load more
    /// - `?`: Help, `q`: Quit
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if self.input_mode == InputMode::Editing {
            match key_event.code {
                KeyCode::Enter => {
                    self.input_mode = InputMode::Normal;
                    let query = std::mem::take(&mut self.pending_query);
                    self.submit_query(&query);
                }
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                    self.pending_query.clear();
                }
                KeyCode::Backspace => {
                    self.pending_query.pop();
                }
                KeyCode::Char(c) => {
                    self.pending_query.push(c);
                }
                _ => {}
            }
            return;
        }

        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        if let Some(active) = self.active_movie.clone() {
            match key_event.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Esc | KeyCode::Backspace => self.close_detail(),
                KeyCode::Char('f') => {
                    self.toggle_favorite(&active);
                }
                // Remove & close
                KeyCode::Char('x') => {
                    if self.is_favorite(&active.id) {
                        self.toggle_favorite(&active);
                        self.close_detail();
                    }
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => {
                self.pending_query = self.view.query.clone();
                self.input_mode = InputMode::Editing;
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection_down(),
            KeyCode::Tab => self.switch_section(self.section.next()),
            KeyCode::BackTab => self.switch_section(self.section.prev()),
            KeyCode::Enter => {
                if let Some(movie) = self.selected_movie().cloned() {
                    self.select_movie(movie);
                }
            }
            KeyCode::Char('y') => self.cycle_year_filter(),
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('m') => self.toggle_force_mock(),
            KeyCode::Char('c') => self.clear_filters(),
            KeyCode::Char('l') => self.toggle_my_list(),
            KeyCode::Char('f') => {
                if let Some(movie) = self.selected_movie().cloned() {
                    self.toggle_favorite(&movie);
                }
            }
            KeyCode::Char('n') => self.load_more(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }
}
