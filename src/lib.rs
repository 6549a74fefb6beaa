//! Cinewatch Library
//!
//! Search, filter and favorite movies from OMDb in the terminal. The binary
//! wires these modules together; they are exposed here for integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod collections;
pub mod data;
pub mod library;
pub mod loader;
pub mod logging;
pub mod ui;
