//! Error types for movie search functionality.

use thiserror::Error;
use uuid::Uuid;

/// User-facing text for a search the upstream API reported as empty.
pub const NO_RESULTS_MESSAGE: &str = "No results found.";
/// User-facing text for a search that failed in transport.
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching movie data.";
/// Fallback reason when the API rejects a detail lookup without saying why.
pub const NO_DETAILS_MESSAGE: &str = "No details found.";

/// Failures of a title search.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The API answered but reported no matching titles.
    #[error("Search returned no results: {reason}")]
    NotFound {
        /// Reason reported by the API
        reason: String,
    },

    /// The request never produced a usable API envelope.
    #[error("Search transport failure: {reason}")]
    Transport {
        /// Description of the network, timeout or decoding failure
        reason: String,
    },
}

impl SearchError {
    /// Message shown to the user for this failure.
    ///
    /// The two kinds stay distinguishable: an empty search asks the user to
    /// try another title, a transport failure tells them the lookup broke.
    pub fn user_message(&self) -> &'static str {
        match self {
            SearchError::NotFound { .. } => NO_RESULTS_MESSAGE,
            SearchError::Transport { .. } => FETCH_FAILED_MESSAGE,
        }
    }
}

/// Failures of a single detail lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetailError {
    /// The API rejected the identifier.
    #[error("Details not found: {0}")]
    NotFound(String),

    /// The request never produced a usable API envelope.
    #[error("Detail transport failure: {reason}")]
    Transport {
        /// Description of the network, timeout or decoding failure
        reason: String,
    },
}

/// Rejected search input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The title was empty or whitespace only.
    #[error("Please enter a movie title.")]
    Empty,
}

/// Reasons a pipeline run produced no outcome at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunError {
    /// The title was rejected before any network call.
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),

    /// The run was cancelled, usually because a newer search superseded it.
    #[error("Search run {run_id} was cancelled")]
    Cancelled {
        /// Identifier of the abandoned run
        run_id: Uuid,
    },
}
