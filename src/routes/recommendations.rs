use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
    services::recommendations,
};

/// Handler for recommendations endpoint
#[tracing::instrument(skip_all, fields(request_id = %request_id, title = %request.title))]
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!("Processing recommendation request");

    let response =
        recommendations::recommend_with_posters(&state.recommender, &state.posters, &request.title)
            .await?;

    tracing::info!(
        results = response.recommendations.len(),
        "Recommendations completed"
    );

    Ok(Json(response))
}
