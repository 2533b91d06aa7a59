//! Last-run-wins search session.
//!
//! Each new search cancels the run before it, so a slow stale search can
//! neither leak requests nor overwrite the results of a newer one.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::RunError;
use crate::pipeline::SearchPipeline;
use crate::types::{PipelineRun, SearchQuery};

/// Search entry point for interactive front ends.
#[derive(Debug)]
pub struct SearchSession {
    pipeline: SearchPipeline,
    current: Mutex<Option<CancellationToken>>,
}

impl SearchSession {
    /// Creates a session with no run in progress.
    pub fn new(pipeline: SearchPipeline) -> Self {
        Self {
            pipeline,
            current: Mutex::new(None),
        }
    }

    /// The pipeline runs are executed on.
    pub fn pipeline(&self) -> &SearchPipeline {
        &self.pipeline
    }

    /// Starts a search for `raw_title`, superseding any run still in progress.
    ///
    /// The previous run is cancelled when this is called, not when the
    /// returned future is first polled, so the most recent call always wins
    /// however the futures are scheduled. Blank input is rejected without
    /// touching the previous run.
    ///
    /// # Errors
    ///
    /// - `RunError::InvalidQuery` - The title is empty or whitespace only
    pub fn start(
        &self,
        raw_title: &str,
    ) -> Result<impl Future<Output = Result<PipelineRun, RunError>> + Send + use<>, RunError> {
        let query = SearchQuery::parse(raw_title)?;
        let token = self.begin_run();
        let pipeline = self.pipeline.clone();

        Ok(async move { pipeline.run_cancellable(&query, &token).await })
    }

    /// Like [`SearchSession::start`], folding input errors into the run result.
    ///
    /// # Errors
    ///
    /// The returned future resolves to:
    /// - `RunError::InvalidQuery` - The title is empty or whitespace only
    /// - `RunError::Cancelled` - A newer search superseded this one
    pub fn search(
        &self,
        raw_title: &str,
    ) -> impl Future<Output = Result<PipelineRun, RunError>> + Send + use<> {
        let started = self.start(raw_title);
        async move {
            match started {
                Ok(run) => run.await,
                Err(error) => Err(error),
            }
        }
    }

    /// Cancels the run in progress, if any.
    pub fn cancel_current(&self) {
        if let Some(token) = self.current.lock().take() {
            token.cancel();
        }
    }

    fn begin_run(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.current.lock().replace(token.clone())
            && !previous.is_cancelled()
        {
            debug!("Superseding previous search run");
            previous.cancel();
        }
        token
    }
}
