//! Data types flowing through one search pipeline run.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::QueryError;
use crate::rating::RatingTier;

/// Upstream convention for "field absent".
pub const POSTER_SENTINEL: &str = "N/A";

/// A trimmed, non-empty movie title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Trims `raw` and rejects it if nothing is left.
    ///
    /// # Errors
    ///
    /// - `QueryError::Empty` - If the input is empty or whitespace only
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The trimmed title.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One search hit before detail enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// IMDb identifier used for the detail lookup
    pub imdb_id: String,
    /// Title as listed in the search response
    pub title: String,
    /// Release year as listed in the search response
    pub year: String,
}

/// Full metadata for one title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    /// IMDb identifier
    pub imdb_id: String,
    /// Movie title
    pub title: String,
    /// Release year, possibly a range for series
    pub year: String,
    /// Comma-separated genres
    pub genre: String,
    /// Plot summary
    pub plot: String,
    /// Poster artwork URL or `"N/A"`
    pub poster_url: String,
    /// Decimal rating string or `"N/A"`
    pub rating_value: String,
}

impl MovieDetail {
    /// Whether the record carries poster artwork worth trying to load.
    pub fn has_usable_poster(&self) -> bool {
        let poster = self.poster_url.trim();
        !poster.is_empty() && poster != POSTER_SENTINEL
    }

    /// Colour tier of this record's rating.
    pub fn rating_tier(&self) -> RatingTier {
        RatingTier::classify(&self.rating_value)
    }
}

impl AsRef<MovieDetail> for MovieDetail {
    fn as_ref(&self) -> &MovieDetail {
        self
    }
}

/// A `MovieDetail` whose poster has been verified to load.
///
/// Only the pipeline can construct one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedDetail(MovieDetail);

impl ValidatedDetail {
    pub(crate) fn new(detail: MovieDetail) -> Self {
        Self(detail)
    }

    /// Unwraps the underlying record.
    pub fn into_inner(self) -> MovieDetail {
        self.0
    }
}

impl Deref for ValidatedDetail {
    type Target = MovieDetail;

    fn deref(&self) -> &MovieDetail {
        &self.0
    }
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Displayable records in search-ranking order.
    Results {
        /// At most `display_budget` records
        items: Vec<ValidatedDetail>,
        /// Whether more records survived than the budget allowed
        truncated: bool,
    },
    /// The search succeeded but returned no candidates.
    EmptySearch,
    /// Candidates existed but none had poster artwork.
    NoUsablePosters,
    /// Posters existed but none of them loaded.
    NoLoadablePosters,
    /// The search itself failed.
    SearchFailed {
        /// User-facing reason
        message: String,
    },
}

impl PipelineOutcome {
    /// Builds the outcome for an order-preserved list of validated records.
    ///
    /// Keeps the first `display_budget` records and flags truncation when
    /// more survived. An empty list maps to `NoLoadablePosters`.
    pub fn from_validated(mut validated: Vec<ValidatedDetail>, display_budget: usize) -> Self {
        if validated.is_empty() {
            return PipelineOutcome::NoLoadablePosters;
        }
        let truncated = validated.len() > display_budget;
        validated.truncate(display_budget);
        PipelineOutcome::Results {
            items: validated,
            truncated,
        }
    }

    /// Short name of the variant for logs.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::Results { .. } => "results",
            PipelineOutcome::EmptySearch => "empty_search",
            PipelineOutcome::NoUsablePosters => "no_usable_posters",
            PipelineOutcome::NoLoadablePosters => "no_loadable_posters",
            PipelineOutcome::SearchFailed { .. } => "search_failed",
        }
    }

    /// Records to display; empty for every non-result outcome.
    pub fn items(&self) -> &[ValidatedDetail] {
        match self {
            PipelineOutcome::Results { items, .. } => items.as_slice(),
            _ => &[],
        }
    }
}

/// Position of a run in the search state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Not started
    Idle,
    /// Waiting on the title search
    Searching,
    /// Waiting on detail lookups
    DetailFetching,
    /// Waiting on poster checks
    PosterValidating,
    /// Outcome decided
    Done,
}

/// Why a candidate did not make it into the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DropReason {
    /// The detail lookup failed
    DetailUnavailable(String),
    /// The record had no poster URL
    MissingPoster,
    /// The poster failed to load
    PosterUnloadable,
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateFate {
    /// Passed every filter (it may still fall outside the display budget)
    Kept,
    /// Removed by one of the filters
    Dropped(DropReason),
}

/// Diagnostic record for one candidate, in search-ranking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateReport {
    /// IMDb identifier of the candidate
    pub imdb_id: String,
    /// Title from the search response
    pub title: String,
    /// How the candidate fared
    pub fate: CandidateFate,
}

/// Outcome of a run together with its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRun {
    /// Identifier used in logs for this run
    pub run_id: Uuid,
    /// What the presentation layer should show
    pub outcome: PipelineOutcome,
    /// Per-candidate fates, empty when the search produced nothing
    pub candidates: Vec<CandidateReport>,
    /// Last stage the run entered before finishing
    pub final_stage: PipelineStage,
}
