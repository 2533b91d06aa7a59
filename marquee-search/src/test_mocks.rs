//! Mock metadata source and poster verifier for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{DetailError, SearchError};
use crate::omdb::MetadataSource;
use crate::poster::PosterVerifier;
use crate::types::{MovieDetail, SearchCandidate, SearchQuery};

/// Builds a candidate/detail pair sharing an identifier.
pub fn movie(imdb_id: &str, poster_url: &str, rating: &str) -> (SearchCandidate, MovieDetail) {
    let candidate = SearchCandidate {
        imdb_id: imdb_id.to_string(),
        title: format!("Movie {imdb_id}"),
        year: "2010".to_string(),
    };
    let detail = MovieDetail {
        imdb_id: imdb_id.to_string(),
        title: format!("Movie {imdb_id}"),
        year: "2010".to_string(),
        genre: "Drama".to_string(),
        plot: format!("Plot of {imdb_id}"),
        poster_url: poster_url.to_string(),
        rating_value: rating.to_string(),
    };
    (candidate, detail)
}

/// Poster URL conventionally used for a given identifier in tests.
pub fn poster_for(imdb_id: &str) -> String {
    format!("https://posters.example/{imdb_id}.jpg")
}

/// Mock metadata source with scripted responses and per-call delays.
#[derive(Debug)]
pub struct MockMetadata {
    search_result: Result<Vec<SearchCandidate>, SearchError>,
    search_delay: Duration,
    details: HashMap<String, (Duration, Result<MovieDetail, DetailError>)>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl MockMetadata {
    /// Creates a source whose search returns `candidates` and whose detail
    /// lookups fail until scripted.
    pub fn with_candidates(candidates: Vec<SearchCandidate>) -> Self {
        Self {
            search_result: Ok(candidates),
            search_delay: Duration::ZERO,
            details: HashMap::new(),
            search_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    /// Creates a source whose search always fails with `error`.
    pub fn failing(error: SearchError) -> Self {
        Self {
            search_result: Err(error),
            ..Self::with_candidates(Vec::new())
        }
    }

    /// Creates a source from candidate/detail pairs, all answering immediately.
    pub fn from_movies(movies: Vec<(SearchCandidate, MovieDetail)>) -> Self {
        let candidates = movies.iter().map(|(c, _)| c.clone()).collect();
        movies
            .into_iter()
            .fold(Self::with_candidates(candidates), |mock, (_, detail)| {
                mock.detail(detail)
            })
    }

    /// Scripts an immediate detail response.
    pub fn detail(self, detail: MovieDetail) -> Self {
        self.delayed_detail(detail, Duration::ZERO)
    }

    /// Scripts a detail response that resolves after `delay`.
    pub fn delayed_detail(mut self, detail: MovieDetail, delay: Duration) -> Self {
        self.details
            .insert(detail.imdb_id.clone(), (delay, Ok(detail)));
        self
    }

    /// Scripts a failing detail lookup.
    pub fn detail_error(mut self, imdb_id: &str, error: DetailError) -> Self {
        self.details
            .insert(imdb_id.to_string(), (Duration::ZERO, Err(error)));
        self
    }

    /// Delays the search response.
    pub fn search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    /// Number of search calls received.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of detail lookups received.
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for MockMetadata {
    async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchCandidate>, SearchError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if !self.search_delay.is_zero() {
            tokio::time::sleep(self.search_delay).await;
        }
        self.search_result.clone()
    }

    async fn fetch_details(&self, imdb_id: &str) -> Result<MovieDetail, DetailError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        match self.details.get(imdb_id) {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                result.clone()
            }
            None => Err(DetailError::NotFound("Incorrect IMDb ID.".to_string())),
        }
    }
}

/// Mock poster verifier that loads a fixed set of URLs.
#[derive(Debug)]
pub struct MockPosters {
    loadable: Option<HashSet<String>>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockPosters {
    /// Every poster loads.
    pub fn all_loadable() -> Self {
        Self {
            loadable: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// No poster loads.
    pub fn none_loadable() -> Self {
        Self::only(Vec::<String>::new())
    }

    /// Only the given URLs load.
    pub fn only<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loadable: Some(urls.into_iter().map(Into::into).collect()),
            ..Self::all_loadable()
        }
    }

    /// Every check takes `delay` before resolving.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of verify calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Largest number of checks observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PosterVerifier for MockPosters {
    async fn verify(&self, poster_url: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match &self.loadable {
            None => true,
            Some(urls) => urls.contains(poster_url),
        }
    }
}
