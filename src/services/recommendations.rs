use crate::{
    error::AppResult,
    models::RecommendationResponse,
    services::{PosterResolver, Recommender},
};

/// Recommends movies similar to `title`, each with a poster
///
/// Recommender errors (unknown title, degenerate catalog) abort the request.
/// Poster lookups cannot fail, so a successful response always holds the full
/// list.
pub async fn recommend_with_posters(
    recommender: &Recommender,
    resolver: &PosterResolver,
    title: &str,
) -> AppResult<RecommendationResponse> {
    let ranked = recommender.recommend(title)?;
    let recommendations = resolver.resolve_batch(&ranked).await;

    Ok(RecommendationResponse {
        query: title.to_string(),
        recommendations,
    })
}
