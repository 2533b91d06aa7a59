//! Search pipeline: search, enrich, filter, verify, truncate.
//!
//! Both fan-out stages use `join_all`, which waits for every future and yields
//! results in input order. Survivors are therefore always a stable filter of
//! the search ranking, whatever order the requests complete in.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use marquee_core::{MarqueeConfig, MarqueeError, PipelineConfig};
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::errors::{DetailError, RunError};
use crate::omdb::{MetadataSource, OmdbClient};
use crate::poster::{HttpPosterValidator, PosterVerifier};
use crate::types::{
    CandidateFate, CandidateReport, DropReason, MovieDetail, PipelineOutcome, PipelineRun,
    PipelineStage, SearchCandidate, SearchQuery, ValidatedDetail,
};

/// Drops every record without usable poster artwork, keeping order.
pub fn retain_usable_posters<T: AsRef<MovieDetail>>(records: Vec<T>) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| record.as_ref().has_usable_poster())
        .collect()
}

/// A fetched detail and its position in the search ranking.
struct Ranked {
    index: usize,
    detail: MovieDetail,
}

impl AsRef<MovieDetail> for Ranked {
    fn as_ref(&self) -> &MovieDetail {
        &self.detail
    }
}

/// Orchestrates one search from title to displayable records.
#[derive(Debug, Clone)]
pub struct SearchPipeline {
    metadata: Arc<dyn MetadataSource>,
    posters: Arc<dyn PosterVerifier>,
    config: PipelineConfig,
    limiter: Option<Arc<Semaphore>>,
}

impl SearchPipeline {
    /// Creates a pipeline over the given collaborators.
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        posters: Arc<dyn PosterVerifier>,
        config: PipelineConfig,
    ) -> Self {
        let limiter = config
            .max_concurrent_requests
            .map(|permits| Arc::new(Semaphore::new(permits.clamp(1, Semaphore::MAX_PERMITS))));

        Self {
            metadata,
            posters,
            config,
            limiter,
        }
    }

    /// Creates a pipeline backed by OMDb and HTTP poster checks.
    ///
    /// # Errors
    ///
    /// - `MarqueeError::Configuration` - Missing API key or unparseable endpoint
    /// - `MarqueeError::Http` - An HTTP client could not be built
    pub fn from_config(config: &MarqueeConfig) -> Result<Self, MarqueeError> {
        let metadata = Arc::new(OmdbClient::new(config)?);
        let posters = Arc::new(HttpPosterValidator::new(config)?);
        Ok(Self::new(metadata, posters, config.pipeline.clone()))
    }

    /// Maximum number of records a run returns.
    pub fn display_budget(&self) -> usize {
        self.config.display_budget
    }

    /// Runs the pipeline and returns only the outcome.
    pub async fn run(&self, query: &SearchQuery) -> PipelineOutcome {
        self.run_detailed(query).await.outcome
    }

    /// Runs the pipeline and returns the outcome with per-candidate diagnostics.
    pub async fn run_detailed(&self, query: &SearchQuery) -> PipelineRun {
        self.execute(Uuid::new_v4(), query).await
    }

    /// Runs the pipeline until it finishes or `cancel` fires.
    ///
    /// Cancellation drops every in-flight request of the run.
    ///
    /// # Errors
    ///
    /// - `RunError::Cancelled` - The token fired before the run finished
    pub async fn run_cancellable(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<PipelineRun, RunError> {
        let run_id = Uuid::new_v4();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(%run_id, "Search run cancelled");
                Err(RunError::Cancelled { run_id })
            }
            run = self.execute(run_id, query) => Ok(run),
        }
    }

    async fn execute(&self, run_id: Uuid, query: &SearchQuery) -> PipelineRun {
        let span = info_span!("search_pipeline", %run_id, query = %query);
        self.assemble(run_id, query).instrument(span).await
    }

    async fn assemble(&self, run_id: Uuid, query: &SearchQuery) -> PipelineRun {
        let started = Instant::now();
        let mut stage = PipelineStage::Idle;

        advance(&mut stage, PipelineStage::Searching);
        let mut candidates = match self.metadata.search(query).await {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(%error, "Search failed");
                let outcome = PipelineOutcome::SearchFailed {
                    message: error.user_message().to_string(),
                };
                return finish(run_id, outcome, Vec::new(), stage, started);
            }
        };

        if candidates.is_empty() {
            return finish(run_id, PipelineOutcome::EmptySearch, Vec::new(), stage, started);
        }
        candidates.truncate(self.config.search_result_limit);

        advance(&mut stage, PipelineStage::DetailFetching);
        let lookups = join_all(
            candidates
                .iter()
                .map(|candidate| self.fetch_detail(&candidate.imdb_id)),
        )
        .await;

        // Anything not overwritten below was fetched but lacked poster artwork
        let mut fates = vec![CandidateFate::Dropped(DropReason::MissingPoster); candidates.len()];
        let mut fetched = Vec::new();
        for (index, (candidate, lookup)) in candidates.iter().zip(lookups).enumerate() {
            match lookup {
                Ok(detail) => fetched.push(Ranked { index, detail }),
                Err(error) => {
                    debug!(
                        imdb_id = %candidate.imdb_id,
                        %error,
                        "Dropping candidate: details unavailable"
                    );
                    fates[index] =
                        CandidateFate::Dropped(DropReason::DetailUnavailable(error.to_string()));
                }
            }
        }

        let fetched_count = fetched.len();
        let usable = retain_usable_posters(fetched);
        if usable.len() < fetched_count {
            debug!(
                dropped = fetched_count - usable.len(),
                "Dropping candidates without poster artwork"
            );
        }

        if usable.is_empty() {
            let reports = reports_for(&candidates, fates);
            return finish(run_id, PipelineOutcome::NoUsablePosters, reports, stage, started);
        }

        advance(&mut stage, PipelineStage::PosterValidating);
        let verdicts = join_all(
            usable
                .iter()
                .map(|ranked| self.verify_poster(&ranked.detail.poster_url)),
        )
        .await;

        let mut validated = Vec::new();
        for (ranked, loaded) in usable.into_iter().zip(verdicts) {
            if loaded {
                fates[ranked.index] = CandidateFate::Kept;
                validated.push(ValidatedDetail::new(ranked.detail));
            } else {
                debug!(imdb_id = %ranked.detail.imdb_id, "Dropping candidate: poster did not load");
                fates[ranked.index] = CandidateFate::Dropped(DropReason::PosterUnloadable);
            }
        }

        let reports = reports_for(&candidates, fates);
        let outcome = PipelineOutcome::from_validated(validated, self.config.display_budget);
        finish(run_id, outcome, reports, stage, started)
    }

    async fn fetch_detail(&self, imdb_id: &str) -> Result<MovieDetail, DetailError> {
        let _permit = self.acquire_permit().await;
        self.metadata.fetch_details(imdb_id).await
    }

    async fn verify_poster(&self, poster_url: &str) -> bool {
        let _permit = self.acquire_permit().await;
        self.posters.verify(poster_url).await
    }

    async fn acquire_permit(&self) -> Option<SemaphorePermit<'_>> {
        match &self.limiter {
            // The semaphore is never closed, so acquisition only fails on shutdown
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        }
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    debug!(from = ?*stage, to = ?next, "Pipeline stage transition");
    *stage = next;
}

fn reports_for(
    candidates: &[SearchCandidate],
    fates: impl IntoIterator<Item = CandidateFate>,
) -> Vec<CandidateReport> {
    candidates
        .iter()
        .zip(fates)
        .map(|(candidate, fate)| CandidateReport {
            imdb_id: candidate.imdb_id.clone(),
            title: candidate.title.clone(),
            fate,
        })
        .collect()
}

fn finish(
    run_id: Uuid,
    outcome: PipelineOutcome,
    candidates: Vec<CandidateReport>,
    final_stage: PipelineStage,
    started: Instant,
) -> PipelineRun {
    debug!(from = ?final_stage, to = ?PipelineStage::Done, "Pipeline stage transition");
    info!(
        outcome = outcome.label(),
        shown = outcome.items().len(),
        candidates = candidates.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Search run finished"
    );

    PipelineRun {
        run_id,
        outcome,
        candidates,
        final_stage,
    }
}
