use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct PosterQuery {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PosterResponse {
    pub movie_id: u64,
    pub poster_url: String,
}

/// Handler for single poster lookups
///
/// Always succeeds; failed lookups come back as placeholder URLs.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<u64>,
    Query(params): Query<PosterQuery>,
) -> Json<PosterResponse> {
    let poster_url = state
        .posters
        .resolve_poster(movie_id, params.title.as_deref())
        .await;

    Json(PosterResponse {
        movie_id,
        poster_url,
    })
}
