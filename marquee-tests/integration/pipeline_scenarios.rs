//! End-to-end search scenarios against mock OMDb and poster servers.

use std::io::Cursor;

use marquee_core::MarqueeConfig;
use marquee_search::{
    CandidateFate, DropReason, PipelineOutcome, PipelineStage, RatingTier, SearchPipeline,
    SearchQuery,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "integration-key";

/// Mock OMDb endpoint plus a poster host serving real PNG bytes.
struct Upstream {
    omdb: MockServer,
    posters: MockServer,
}

impl Upstream {
    async fn start() -> Self {
        Self {
            omdb: MockServer::start().await,
            posters: MockServer::start().await,
        }
    }

    fn config(&self) -> MarqueeConfig {
        let mut config = MarqueeConfig::default();
        config.api.api_key = Some(API_KEY.to_string());
        config.api.base_url = format!("{}/", self.omdb.uri());
        config
    }

    fn pipeline(&self) -> anyhow::Result<SearchPipeline> {
        let config = self.config();
        config.validate()?;
        Ok(SearchPipeline::from_config(&config)?)
    }

    fn poster_url(&self, imdb_id: &str) -> String {
        format!("{}/posters/{imdb_id}.png", self.posters.uri())
    }

    async fn search_returns(&self, title: &str, body: Value) {
        Mock::given(method("GET"))
            .and(query_param("apikey", API_KEY))
            .and(query_param("s", title))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.omdb)
            .await;
    }

    async fn details_return(&self, imdb_id: &str, title: &str, poster: &str, rating: &str) {
        Mock::given(method("GET"))
            .and(query_param("apikey", API_KEY))
            .and(query_param("i", imdb_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": "True",
                "imdbID": imdb_id,
                "Title": title,
                "Year": "2010",
                "Genre": "Action, Sci-Fi",
                "Plot": "A thief who steals corporate secrets.",
                "Poster": poster,
                "imdbRating": rating,
            })))
            .mount(&self.omdb)
            .await;
    }

    async fn serve_poster(&self, imdb_id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/posters/{imdb_id}.png")))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(png_bytes()),
            )
            .mount(&self.posters)
            .await;
    }

    /// Searching `title` yields `ids` in order, each with a detail record.
    async fn movies(&self, title: &str, ids: &[String]) {
        let hits: Vec<Value> = ids
            .iter()
            .map(|id| json!({"Title": title, "Year": "2010", "imdbID": id, "Type": "movie"}))
            .collect();
        self.search_returns(title, json!({"Response": "True", "Search": hits}))
            .await;
        for id in ids {
            self.details_return(id, title, &self.poster_url(id), "7.5")
                .await;
        }
    }
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(10, 15)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn query(title: &str) -> SearchQuery {
    SearchQuery::parse(title).unwrap()
}

fn ids(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("tt{i:07}")).collect()
}

fn item_ids(outcome: &PipelineOutcome) -> Vec<String> {
    outcome
        .items()
        .iter()
        .map(|item| item.imdb_id.clone())
        .collect()
}

#[tokio::test]
async fn test_inception_single_result() -> anyhow::Result<()> {
    let upstream = Upstream::start().await;
    upstream
        .search_returns(
            "Inception",
            json!({
                "Response": "True",
                "Search": [{"Title": "Inception", "Year": "2010", "imdbID": "tt1375666"}],
            }),
        )
        .await;
    upstream
        .details_return(
            "tt1375666",
            "Inception",
            &upstream.poster_url("tt1375666"),
            "8.8",
        )
        .await;
    upstream.serve_poster("tt1375666").await;

    let outcome = upstream.pipeline()?.run(&query("Inception")).await;

    assert!(matches!(
        outcome,
        PipelineOutcome::Results {
            truncated: false,
            ..
        }
    ));
    assert_eq!(item_ids(&outcome), vec!["tt1375666"]);
    assert_eq!(outcome.items()[0].rating_tier(), RatingTier::High);
    Ok(())
}

#[tokio::test]
async fn test_unknown_title_is_search_failed() -> anyhow::Result<()> {
    let upstream = Upstream::start().await;
    upstream
        .search_returns(
            "Zzzznotamovie123",
            json!({"Response": "False", "Error": "Movie not found!"}),
        )
        .await;

    let outcome = upstream.pipeline()?.run(&query("Zzzznotamovie123")).await;

    assert_eq!(
        outcome,
        PipelineOutcome::SearchFailed {
            message: "No results found.".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_broken_upstream_is_search_failed() -> anyhow::Result<()> {
    let upstream = Upstream::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
        .mount(&upstream.omdb)
        .await;

    let outcome = upstream.pipeline()?.run(&query("Inception")).await;

    assert_eq!(
        outcome,
        PipelineOutcome::SearchFailed {
            message: "Error fetching movie data.".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_empty_search_list() -> anyhow::Result<()> {
    let upstream = Upstream::start().await;
    upstream
        .search_returns("Nothing", json!({"Response": "True", "Search": []}))
        .await;

    let outcome = upstream.pipeline()?.run(&query("Nothing")).await;

    assert_eq!(outcome, PipelineOutcome::EmptySearch);
    Ok(())
}

#[tokio::test]
async fn test_twelve_loadable_candidates_are_truncated_in_order() -> anyhow::Result<()> {
    let upstream = Upstream::start().await;
    let all = ids(12);
    upstream.movies("Star", &all).await;
    for id in &all {
        upstream.serve_poster(id).await;
    }

    let outcome = upstream.pipeline()?.run(&query("Star")).await;

    assert!(matches!(
        outcome,
        PipelineOutcome::Results {
            truncated: true,
            ..
        }
    ));
    assert_eq!(item_ids(&outcome), all[..9].to_vec());
    Ok(())
}

#[tokio::test]
async fn test_sentinel_posters_never_touch_poster_host() -> anyhow::Result<()> {
    let upstream = Upstream::start().await;
    let all = ids(3);
    let hits: Vec<Value> = all
        .iter()
        .map(|id| json!({"Title": "Obscure", "Year": "1950", "imdbID": id}))
        .collect();
    upstream
        .search_returns("Obscure", json!({"Response": "True", "Search": hits}))
        .await;
    for id in &all {
        upstream.details_return(id, "Obscure", "N/A", "N/A").await;
    }
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream.posters)
        .await;

    let run = upstream.pipeline()?.run_detailed(&query("Obscure")).await;

    assert_eq!(run.outcome, PipelineOutcome::NoUsablePosters);
    assert!(
        run.candidates
            .iter()
            .all(|report| report.fate == CandidateFate::Dropped(DropReason::MissingPoster))
    );
    upstream.posters.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_unreachable_posters_are_no_loadable_posters() -> anyhow::Result<()> {
    let upstream = Upstream::start().await;
    let all = ids(2);
    upstream.movies("Lost", &all).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&upstream.posters)
        .await;

    let run = upstream.pipeline()?.run_detailed(&query("Lost")).await;

    assert_eq!(run.outcome, PipelineOutcome::NoLoadablePosters);
    assert_eq!(run.final_stage, PipelineStage::PosterValidating);
    Ok(())
}

#[tokio::test]
async fn test_mixed_upstream_keeps_only_verified_candidates() -> anyhow::Result<()> {
    let upstream = Upstream::start().await;
    let all = ids(4);
    let hits: Vec<Value> = all
        .iter()
        .map(|id| json!({"Title": "Mixed", "Year": "2001", "imdbID": id}))
        .collect();
    upstream
        .search_returns("Mixed", json!({"Response": "True", "Search": hits}))
        .await;

    // 1: loads, 2: detail rejected, 3: no poster, 4: loads
    upstream
        .details_return(&all[0], "Mixed", &upstream.poster_url(&all[0]), "6.5")
        .await;
    Mock::given(method("GET"))
        .and(query_param("i", all[1].as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"Response": "False", "Error": "Incorrect IMDb ID."})),
        )
        .mount(&upstream.omdb)
        .await;
    upstream.details_return(&all[2], "Mixed", "N/A", "7.0").await;
    upstream
        .details_return(&all[3], "Mixed", &upstream.poster_url(&all[3]), "4.0")
        .await;
    upstream.serve_poster(&all[0]).await;
    upstream.serve_poster(&all[3]).await;

    let run = upstream.pipeline()?.run_detailed(&query("Mixed")).await;

    assert_eq!(item_ids(&run.outcome), vec![all[0].clone(), all[3].clone()]);
    let fates: Vec<_> = run.candidates.iter().map(|c| c.fate.clone()).collect();
    assert_eq!(fates[0], CandidateFate::Kept);
    assert!(matches!(
        fates[1],
        CandidateFate::Dropped(DropReason::DetailUnavailable(_))
    ));
    assert_eq!(fates[2], CandidateFate::Dropped(DropReason::MissingPoster));
    assert_eq!(fates[3], CandidateFate::Kept);
    Ok(())
}

#[tokio::test]
async fn test_outcome_serializes_with_status_tag() -> anyhow::Result<()> {
    let upstream = Upstream::start().await;
    upstream
        .search_returns("Nothing", json!({"Response": "True", "Search": []}))
        .await;

    let outcome = upstream.pipeline()?.run(&query("Nothing")).await;

    assert_eq!(
        serde_json::to_value(&outcome)?,
        json!({"status": "empty_search"})
    );
    Ok(())
}
