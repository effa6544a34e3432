/// TMDB API provider
///
/// API Flow:
/// 1. Details: /movie/{movie_id} → metadata including `poster_path`
/// 2. Search: /search/movie?query= → ranked `results`, each with an optional `poster_path`
///
/// One HTTP client is shared by every call so connections are reused across a batch.
use std::time::Duration;

use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetails, MovieSearchResults},
    services::providers::PosterProvider,
};

const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    /// Creates a provider whose requests give up after `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn movie_url(&self, movie_id: u64) -> String {
        format!("{}/movie/{}", self.api_url, movie_id)
    }

    fn search_url(&self) -> String {
        format!("{}/search/movie", self.api_url)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::PosterFetch(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Self::parse_body(response).await
    }

    async fn parse_body<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(error = %e, response = %body, "Unparseable TMDB response");
            AppError::PosterFetch(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl PosterProvider for TmdbProvider {
    #[instrument(skip(self), fields(provider = "tmdb"))]
    async fn fetch_movie(&self, movie_id: u64) -> AppResult<MovieDetails> {
        let response = self
            .http_client
            .get(self.movie_url(movie_id))
            .query(&[("api_key", self.api_key.as_str()), ("language", LANGUAGE)])
            .send()
            .await?;

        let details: MovieDetails = Self::parse(response).await?;

        tracing::debug!(
            movie_id,
            has_poster = details.poster_path.is_some(),
            "Movie details fetched"
        );

        Ok(details)
    }

    #[instrument(skip(self), fields(provider = "tmdb"))]
    async fn search_movies(&self, query: &str) -> AppResult<MovieSearchResults> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let response = self
            .http_client
            .get(self.search_url())
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "TMDB search returned an error status");
        }

        // Error bodies are JSON without `results`, which reads as an empty search
        let results: MovieSearchResults = Self::parse_body(response).await?;

        tracing::debug!(
            results = results.results.len(),
            "Movie search completed"
        );

        Ok(results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
