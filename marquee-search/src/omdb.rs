//! OMDb metadata client.
//!
//! Builds "search by title" and "fetch by identifier" requests, performs them
//! and maps the API's `Response: "True" | "False"` envelope onto typed results.

use async_trait::async_trait;
use marquee_core::{MarqueeConfig, MarqueeError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::errors::{DetailError, NO_DETAILS_MESSAGE, NO_RESULTS_MESSAGE, SearchError};
use crate::types::{MovieDetail, POSTER_SENTINEL, SearchCandidate, SearchQuery};

/// Source of movie metadata.
///
/// Implementations perform exactly one upstream request per call and keep no
/// state between calls.
#[async_trait]
pub trait MetadataSource: Send + Sync + std::fmt::Debug {
    /// Search titles matching `query`, best match first.
    ///
    /// # Errors
    /// - `SearchError::NotFound` - The API reported no matches
    /// - `SearchError::Transport` - Network, timeout or malformed response
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchCandidate>, SearchError>;

    /// Fetch the full record for one IMDb identifier.
    ///
    /// # Errors
    /// - `DetailError::NotFound` - The API rejected the identifier
    /// - `DetailError::Transport` - Network, timeout or malformed response
    async fn fetch_details(&self, imdb_id: &str) -> Result<MovieDetail, DetailError>;
}

/// Search response envelope.
#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// Single hit inside a search response.
#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
}

/// Detail response envelope.
#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

fn is_success(response: Option<&str>) -> bool {
    response.is_some_and(|r| r.eq_ignore_ascii_case("true"))
}

fn or_sentinel(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| POSTER_SENTINEL.to_string())
}

/// OMDb client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    result_limit: usize,
}

impl OmdbClient {
    /// Creates a client from the API section of `config`.
    ///
    /// # Errors
    ///
    /// - `MarqueeError::Configuration` - Missing API key or unparseable endpoint
    /// - `MarqueeError::Http` - The HTTP client could not be built
    pub fn new(config: &MarqueeConfig) -> Result<Self, MarqueeError> {
        let api_key = config.require_api_key()?.to_string();
        let base_url =
            Url::parse(&config.api.base_url).map_err(|e| MarqueeError::Configuration {
                reason: format!("invalid metadata endpoint '{}': {e}", config.api.base_url),
            })?;

        let client = reqwest::Client::builder()
            .timeout(config.api.request_timeout)
            .user_agent(config.api.user_agent)
            .build()
            .map_err(|e| MarqueeError::Http {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            result_limit: config.pipeline.search_result_limit,
        })
    }

    /// Request target for a title search.
    pub fn search_url(&self, query: &SearchQuery) -> Url {
        self.request_url("s", query.as_str())
    }

    /// Request target for a detail lookup.
    pub fn details_url(&self, imdb_id: &str) -> Url {
        self.request_url("i", imdb_id)
    }

    fn request_url(&self, key: &str, value: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair(key, value);
        url
    }

    /// Performs one GET and decodes the JSON envelope regardless of status.
    ///
    /// Error text never includes the request URL, which carries the API key.
    async fn fetch_envelope<T: DeserializeOwned>(&self, url: Url) -> Result<T, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e.without_url()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| format!("reading response body failed: {}", e.without_url()))?;

        serde_json::from_slice(&body)
            .map_err(|e| format!("unexpected response (HTTP {status}): {e}"))
    }
}

#[async_trait]
impl MetadataSource for OmdbClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchCandidate>, SearchError> {
        debug!(title = %query, "Searching OMDb");

        let envelope: OmdbSearchResponse = self
            .fetch_envelope(self.search_url(query))
            .await
            .map_err(|reason| SearchError::Transport { reason })?;

        if !is_success(envelope.response.as_deref()) {
            return Err(SearchError::NotFound {
                reason: envelope
                    .error
                    .unwrap_or_else(|| NO_RESULTS_MESSAGE.to_string()),
            });
        }

        let candidates: Vec<SearchCandidate> = envelope
            .search
            .into_iter()
            .filter_map(|item| {
                let imdb_id = item.imdb_id.filter(|id| !id.trim().is_empty())?;
                Some(SearchCandidate {
                    imdb_id,
                    title: or_sentinel(item.title),
                    year: or_sentinel(item.year),
                })
            })
            .take(self.result_limit)
            .collect();

        debug!(title = %query, count = candidates.len(), "OMDb search returned candidates");
        Ok(candidates)
    }

    async fn fetch_details(&self, imdb_id: &str) -> Result<MovieDetail, DetailError> {
        debug!(imdb_id, "Fetching OMDb details");

        let envelope: OmdbResponse = self
            .fetch_envelope(self.details_url(imdb_id))
            .await
            .map_err(|reason| DetailError::Transport { reason })?;

        if !is_success(envelope.response.as_deref()) {
            return Err(DetailError::NotFound(
                envelope
                    .error
                    .unwrap_or_else(|| NO_DETAILS_MESSAGE.to_string()),
            ));
        }

        Ok(MovieDetail {
            imdb_id: envelope
                .imdb_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| imdb_id.to_string()),
            title: or_sentinel(envelope.title),
            year: or_sentinel(envelope.year),
            genre: or_sentinel(envelope.genre),
            plot: or_sentinel(envelope.plot),
            poster_url: or_sentinel(envelope.poster),
            rating_value: or_sentinel(envelope.imdb_rating),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(base_url: &str) -> OmdbClient {
        let mut config = MarqueeConfig::default();
        config.api.api_key = Some("test-key".to_string());
        config.api.base_url = format!("{base_url}/");
        OmdbClient::new(&config).unwrap()
    }

    fn query(title: &str) -> SearchQuery {
        SearchQuery::parse(title).unwrap()
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = MarqueeConfig::default();
        assert!(matches!(
            OmdbClient::new(&config),
            Err(MarqueeError::Configuration { .. })
        ));
    }

    #[test]
    fn test_request_targets_carry_key_and_encoded_title() {
        let client = client_for("https://www.omdbapi.com");

        let url = client.search_url(&query("The Matrix & Co"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("apikey".to_string(), "test-key".to_string()),
                ("s".to_string(), "The Matrix & Co".to_string()),
            ]
        );

        let url = client.details_url("tt1375666");
        assert_eq!(url.host_str(), Some("www.omdbapi.com"));
        assert!(url.query().unwrap().ends_with("i=tt1375666"));
    }

    #[tokio::test]
    async fn test_search_keeps_api_order_and_caps_results() {
        let server = MockServer::start().await;
        let hits: Vec<_> = (0..20)
            .map(|i| json!({"Title": format!("Movie {i}"), "Year": "2001", "imdbID": format!("tt{i:07}")}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("s", "Movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Search": hits,
                "totalResults": "20",
                "Response": "True"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let candidates = client_for(&server.uri())
            .search(&query("Movie"))
            .await
            .unwrap();

        assert_eq!(candidates.len(), 15);
        assert_eq!(candidates[0].imdb_id, "tt0000000");
        assert_eq!(candidates[14].imdb_id, "tt0000014");
        assert_eq!(candidates[3].title, "Movie 3");
    }

    #[tokio::test]
    async fn test_search_failure_envelope_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": "False",
                "Error": "Movie not found!"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server.uri())
            .search(&query("Zzzznotamovie123"))
            .await;

        assert_eq!(
            result,
            Err(SearchError::NotFound {
                reason: "Movie not found!".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_search_malformed_body_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server.uri()).search(&query("Inception")).await;

        match result {
            Err(SearchError::Transport { reason }) => assert!(reason.contains("502")),
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_failure() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = client_for(&uri);
        assert!(matches!(
            client.search(&query("Inception")).await,
            Err(SearchError::Transport { .. })
        ));
        assert!(matches!(
            client.fetch_details("tt1375666").await,
            Err(DetailError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_details_maps_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("i", "tt1375666"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": "Inception",
                "Year": "2010",
                "Genre": "Action, Adventure, Sci-Fi",
                "Plot": "A thief who steals corporate secrets...",
                "Poster": "https://m.media-amazon.com/images/inception.jpg",
                "imdbRating": "8.8",
                "imdbID": "tt1375666",
                "Response": "True"
            })))
            .mount(&server)
            .await;

        let detail = client_for(&server.uri())
            .fetch_details("tt1375666")
            .await
            .unwrap();

        assert_eq!(detail.title, "Inception");
        assert_eq!(detail.genre, "Action, Adventure, Sci-Fi");
        assert_eq!(detail.rating_value, "8.8");
        assert!(detail.has_usable_poster());
    }

    #[tokio::test]
    async fn test_fetch_details_fills_missing_fields_with_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": "Obscure Short",
                "Response": "True"
            })))
            .mount(&server)
            .await;

        let detail = client_for(&server.uri())
            .fetch_details("tt0000001")
            .await
            .unwrap();

        assert_eq!(detail.imdb_id, "tt0000001");
        assert_eq!(detail.poster_url, "N/A");
        assert_eq!(detail.rating_value, "N/A");
        assert!(!detail.has_usable_poster());
    }

    #[tokio::test]
    async fn test_fetch_details_failure_uses_fallback_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Response": "False"})))
            .mount(&server)
            .await;

        let result = client_for(&server.uri()).fetch_details("tt9999999").await;

        assert_eq!(
            result,
            Err(DetailError::NotFound("No details found.".to_string()))
        );
    }
}
