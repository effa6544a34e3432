/// Movie metadata provider abstraction
///
/// Poster lookups go through this trait so the resolver's fallback chain can
/// run against TMDB in production and against mocks in tests.
use crate::{
    error::AppResult,
    models::{MovieDetails, MovieSearchResults},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Fetch movie metadata by provider ID
    async fn fetch_movie(&self, movie_id: u64) -> AppResult<MovieDetails>;

    /// Free-text movie search
    ///
    /// Results are in the provider's relevance order.
    async fn search_movies(&self, query: &str) -> AppResult<MovieSearchResults>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
