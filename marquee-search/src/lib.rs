//! Marquee Search - Movie lookup, poster validation and result assembly

#![warn(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Resolves a free-text title into a ranked list of OMDb candidates, enriches
//! every candidate concurrently, drops records without loadable poster
//! artwork and truncates the survivors to a display budget.

pub mod errors;
pub mod omdb;
pub mod pipeline;
pub mod poster;
pub mod rating;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_mocks;

// Re-export main types
pub use errors::{DetailError, QueryError, RunError, SearchError};
pub use omdb::{MetadataSource, OmdbClient};
pub use pipeline::{SearchPipeline, retain_usable_posters};
pub use poster::{HttpPosterValidator, PosterCheck, PosterFailure, PosterVerifier};
pub use rating::RatingTier;
pub use session::SearchSession;
pub use types::{
    CandidateFate, CandidateReport, DropReason, MovieDetail, POSTER_SENTINEL, PipelineOutcome,
    PipelineRun, PipelineStage, SearchCandidate, SearchQuery, ValidatedDetail,
};
