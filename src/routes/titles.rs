use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    #[serde(default)]
    q: Option<String>,
}

/// Handler for the title listing endpoint
///
/// Returns catalog titles in catalog order, filtered by `q` when given.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TitleQuery>,
) -> Json<Vec<String>> {
    let titles = match params.q.as_deref() {
        Some(q) => state.recommender.search_titles(q),
        None => state.recommender.titles(),
    };
    Json(titles.into_iter().map(str::to_string).collect())
}
