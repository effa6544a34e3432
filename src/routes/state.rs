use std::sync::Arc;

use crate::{
    artifacts::Artifacts,
    services::{providers::PosterProvider, PosterResolver, Recommender},
};

/// Shared application state
///
/// Everything in here is read-only once the server starts.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
    pub posters: PosterResolver,
}

impl AppState {
    pub fn new(recommender: Recommender, posters: PosterResolver) -> Self {
        Self {
            recommender,
            posters,
        }
    }

    /// Builds the state from loaded artifacts and a poster provider
    pub fn from_parts(
        artifacts: Arc<Artifacts>,
        provider: Arc<dyn PosterProvider>,
        image_base_url: String,
        poster_delay: std::time::Duration,
    ) -> Self {
        Self::new(
            Recommender::new(artifacts),
            PosterResolver::new(provider, image_base_url, poster_delay),
        )
    }
}
