//! Background data loading
//!
//! Runs collection flows on tokio tasks and reports results to the main loop
//! over a channel. Every request that can be superseded carries the
//! generation that was current when it was issued; the receiver compares it
//! against its own counter and drops stale results on arrival.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::collections::{CollectionBuilder, SearchOutcome};
use crate::data::Movie;

/// Work the application asks the loader to perform
#[derive(Debug, Clone)]
pub enum LoadRequest {
    /// Run the main search flow
    Search {
        generation: u64,
        query: String,
        force_mock: bool,
    },
    /// Compute the recommended row for a completed search
    Recommended { generation: u64, query: String },
    /// Build the 2025 releases row
    Releases,
    /// Rebuild the recently-viewed row from recent search terms
    Recent { generation: u64, terms: Vec<String> },
    /// Resolve the full record for a selected card
    Detail {
        generation: u64,
        movie: Movie,
        force_mock: bool,
    },
}

/// Results sent from background tasks to the main loop
#[derive(Debug, Clone)]
pub enum LoadMessage {
    SearchCompleted {
        generation: u64,
        query: String,
        outcome: SearchOutcome,
    },
    RecommendedReady {
        generation: u64,
        movies: Vec<Movie>,
    },
    ReleasesReady(Vec<Movie>),
    RecentReady {
        generation: u64,
        movies: Vec<Movie>,
    },
    DetailResolved {
        generation: u64,
        movie: Movie,
    },
}

/// Spawns flows and forwards their results
#[derive(Debug, Clone)]
pub struct Loader {
    builder: Arc<CollectionBuilder>,
    sender: mpsc::Sender<LoadMessage>,
}

impl Loader {
    /// Creates a loader and the receiving end of its result channel
    pub fn new(builder: Arc<CollectionBuilder>) -> (Self, mpsc::Receiver<LoadMessage>) {
        let (sender, receiver) = mpsc::channel(32);
        (Self { builder, sender }, receiver)
    }

    /// Starts `request` on a background task; must be called within a tokio runtime
    pub fn dispatch(&self, request: LoadRequest) {
        let builder = Arc::clone(&self.builder);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let message = run(&builder, request).await;
            if let Some(message) = message {
                if sender.send(message).await.is_err() {
                    debug!("load result dropped, receiver closed");
                }
            }
        });
    }

    /// Starts every request in order
    pub fn dispatch_all(&self, requests: impl IntoIterator<Item = LoadRequest>) {
        for request in requests {
            self.dispatch(request);
        }
    }
}

async fn run(builder: &CollectionBuilder, request: LoadRequest) -> Option<LoadMessage> {
    match request {
        LoadRequest::Search {
            generation,
            query,
            force_mock,
        } => {
            let outcome = builder.search(&query, force_mock).await;
            Some(LoadMessage::SearchCompleted {
                generation,
                query,
                outcome,
            })
        }
        LoadRequest::Recommended { generation, query } => match builder.recommended(&query).await {
            Ok(movies) => Some(LoadMessage::RecommendedReady { generation, movies }),
            Err(e) => {
                warn!(query = query.as_str(), error = %e, "recommendations unavailable");
                None
            }
        },
        LoadRequest::Releases => Some(LoadMessage::ReleasesReady(builder.releases().await)),
        LoadRequest::Recent { generation, terms } => Some(LoadMessage::RecentReady {
            generation,
            movies: builder.recent(&terms).await,
        }),
        LoadRequest::Detail {
            generation,
            movie,
            force_mock,
        } => Some(LoadMessage::DetailResolved {
            generation,
            movie: builder.resolve_detail(&movie, force_mock).await,
        }),
    }
}

/// Checks for a pending load result without blocking
///
/// # Returns
/// * `Some(LoadMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(receiver: &mut mpsc::Receiver<LoadMessage>) -> Option<LoadMessage> {
    receiver.try_recv().ok()
}
