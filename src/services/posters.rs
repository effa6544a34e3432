use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::{
    models::{Recommendation, RecommendedMovie},
    services::providers::PosterProvider,
};

/// Shown when the movie has no poster anywhere
pub const NO_IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/500x750.png?text=No+Image";

/// Shown when the metadata API could not be reached or sent an unreadable answer
pub const ERROR_PLACEHOLDER: &str = "https://via.placeholder.com/500x750.png?text=Error";

/// Turns a movie into a displayable poster URL
///
/// Lookups never fail: any provider error is logged and replaced by a
/// placeholder URL so a recommendation list is always complete.
#[derive(Clone)]
pub struct PosterResolver {
    provider: Arc<dyn PosterProvider>,
    image_base_url: String,
    delay: Duration,
}

impl PosterResolver {
    /// `delay` is the pause between successive lookups in `resolve_batch`
    pub fn new(provider: Arc<dyn PosterProvider>, image_base_url: String, delay: Duration) -> Self {
        Self {
            provider,
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
            delay,
        }
    }

    /// Poster URL for `movie_id`, searching by `title` if the movie itself has none
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn resolve_poster(&self, movie_id: u64, title: Option<&str>) -> String {
        let details = match self.provider.fetch_movie(movie_id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(
                    movie_id,
                    error = %e,
                    provider = self.provider.name(),
                    "Movie lookup failed, using error placeholder"
                );
                return ERROR_PLACEHOLDER.to_string();
            }
        };

        if let Some(path) = non_empty(details.poster_path) {
            return self.poster_url(&path);
        }

        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => title,
            None => return NO_IMAGE_PLACEHOLDER.to_string(),
        };

        tracing::debug!(movie_id, title = %title, "No poster on movie, searching by title");

        match self.provider.search_movies(title).await {
            Ok(search) => search
                .results
                .into_iter()
                .next()
                .and_then(|first| non_empty(first.poster_path))
                .map(|path| self.poster_url(&path))
                .unwrap_or_else(|| NO_IMAGE_PLACEHOLDER.to_string()),
            Err(e) => {
                tracing::warn!(
                    movie_id,
                    title = %title,
                    error = %e,
                    provider = self.provider.name(),
                    "Title search failed, using error placeholder"
                );
                ERROR_PLACEHOLDER.to_string()
            }
        }
    }

    /// Resolves posters one after another, pausing between lookups
    pub async fn resolve_batch(&self, recommendations: &[Recommendation]) -> Vec<RecommendedMovie> {
        let mut movies = Vec::with_capacity(recommendations.len());

        for (i, recommendation) in recommendations.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let poster_url = self
                .resolve_poster(recommendation.movie_id, Some(&recommendation.title))
                .await;

            movies.push(RecommendedMovie {
                movie_id: recommendation.movie_id,
                title: recommendation.title.clone(),
                poster_url,
            });
        }

        movies
    }

    fn poster_url(&self, poster_path: &str) -> String {
        if poster_path.starts_with('/') {
            format!("{}{}", self.image_base_url, poster_path)
        } else {
            format!("{}/{}", self.image_base_url, poster_path)
        }
    }
}

fn non_empty(path: Option<String>) -> Option<String> {
    path.filter(|p| !p.trim().is_empty())
}
