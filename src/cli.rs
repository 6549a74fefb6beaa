//! Command-line interface parsing for Cinewatch
//!
//! This module handles parsing of CLI arguments using clap. The OMDb key and
//! endpoint may also come from the environment; a missing key is not an error
//! and simply starts the application in mock mode.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::app::SortBy;
use crate::data::omdb::OMDB_BASE_URL;
use crate::logging::LogLevel;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified sort order is not recognized
    #[error("Invalid sort: '{0}'. Valid sorts: default, newest, oldest, title")]
    InvalidSort(String),

    /// The year filter is not a four-digit year
    #[error("Invalid year: '{0}'. Expected a four-digit year such as 2010")]
    InvalidYear(String),
}

/// Cinewatch - search, filter and favorite movies from OMDb
#[derive(Parser, Debug)]
#[command(name = "cinewatch")]
#[command(about = "Browse OMDb movies from the terminal")]
#[command(version)]
pub struct Cli {
    /// Run a title search immediately at startup
    #[arg(long, value_name = "TITLE")]
    pub query: Option<String>,

    /// Start with force-mock on (never contact OMDb for searches)
    #[arg(long)]
    pub mock: bool,

    /// Initial sort order: default, newest, oldest, title
    #[arg(long, value_name = "SORT")]
    pub sort: Option<String>,

    /// Initial year filter, e.g. 2010
    #[arg(long, value_name = "YEAR")]
    pub year: Option<String>,

    /// OMDb API key
    #[arg(long, env = "OMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OMDb endpoint
    #[arg(long, env = "OMDB_BASE_URL", default_value = OMDB_BASE_URL)]
    pub base_url: String,

    /// Directory for cached responses and saved lists
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Verbosity of the log file
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Query to search right away
    pub initial_query: Option<String>,
    /// Whether force-mock starts enabled
    pub force_mock: bool,
    pub sort_by: SortBy,
    pub year_filter: Option<String>,
    /// OMDb key; `None` when absent or blank
    pub api_key: Option<String>,
    pub base_url: String,
    pub cache_dir: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            initial_query: None,
            force_mock: false,
            sort_by: SortBy::Default,
            year_filter: None,
            api_key: None,
            base_url: OMDB_BASE_URL.to_string(),
            cache_dir: None,
            log_level: LogLevel::Info,
        }
    }
}

/// Parses a sort argument into a `SortBy`.
///
/// # Returns
/// * `Ok(SortBy)` if the string names a sort order
/// * `Err(CliError::InvalidSort)` otherwise
pub fn parse_sort_arg(s: &str) -> Result<SortBy, CliError> {
    SortBy::from_str(s).ok_or_else(|| CliError::InvalidSort(s.to_string()))
}

/// Validates a year filter argument (exactly four ASCII digits)
pub fn parse_year_arg(s: &str) -> Result<String, CliError> {
    let year = s.trim();
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        Ok(year.to_string())
    } else {
        Err(CliError::InvalidYear(s.to_string()))
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the sort or year arguments are invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let sort_by = match cli.sort.as_deref() {
            Some(s) => parse_sort_arg(s)?,
            None => SortBy::Default,
        };
        let year_filter = cli.year.as_deref().map(parse_year_arg).transpose()?;

        Ok(StartupConfig {
            initial_query: cli
                .query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            force_mock: cli.mock,
            sort_by,
            year_filter,
            api_key: cli
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            base_url: cli.base_url.clone(),
            cache_dir: cli.cache_dir.clone(),
            log_level: cli.log_level,
        })
    }
}
