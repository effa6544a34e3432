use serde::{Deserialize, Serialize};

pub mod similarity;
pub mod title;

pub use similarity::{MatrixError, SimilarityMatrix};
pub use title::{CatalogEntry, TitleCatalog};

/// A ranked neighbor of the queried title
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub movie_id: u64,
    pub title: String,
    pub score: f32,
}

/// A recommendation paired with the poster to display for it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedMovie {
    pub movie_id: u64,
    pub title: String,
    pub poster_url: String,
}

/// Request body for the recommendations endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
}

/// Response with the movies most similar to the requested title
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    /// The title the recommendations were computed for
    pub query: String,
    /// Most similar first
    pub recommendations: Vec<RecommendedMovie>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Subset of the TMDB `/movie/{id}` response used for posters
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MovieDetails {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// TMDB `/search/movie` response
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MovieSearchResults {
    #[serde(default)]
    pub results: Vec<MovieDetails>,
}
