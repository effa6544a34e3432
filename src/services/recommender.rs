use std::sync::Arc;

use crate::{
    artifacts::Artifacts,
    error::{AppError, AppResult},
    models::Recommendation,
};

/// Number of neighbors returned per query
pub const RECOMMENDATION_COUNT: usize = 5;

/// Nearest-neighbor lookup over the precomputed similarity matrix
#[derive(Clone)]
pub struct Recommender {
    artifacts: Arc<Artifacts>,
}

impl Recommender {
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Arc<Artifacts> {
        &self.artifacts
    }

    /// Returns the five titles most similar to `title`
    ///
    /// Rows are ranked by descending score; equal scores keep ascending row
    /// order. Neither the queried row nor any other row with the same title
    /// is part of the result.
    pub fn recommend(&self, title: &str) -> AppResult<Vec<Recommendation>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
        }

        let catalog = &self.artifacts.catalog;
        let required = RECOMMENDATION_COUNT + 1;
        if catalog.len() < required {
            return Err(AppError::InsufficientCatalog {
                size: catalog.len(),
                required,
            });
        }

        let row = catalog
            .position(title)
            .ok_or_else(|| AppError::UnknownTitle(title.to_string()))?;

        let scores = self.artifacts.similarity.row(row).ok_or_else(|| {
            AppError::Internal(format!("No similarity row for catalog row {}", row))
        })?;

        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        // sort_by is stable, so ties stay in row order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        // Rows sharing the query's title are shadowed duplicates of it
        let recommendations: Vec<Recommendation> = ranked
            .into_iter()
            .filter(|(j, _)| *j != row)
            .filter_map(|(j, score)| catalog.get(j).map(|entry| (entry, score)))
            .filter(|(entry, _)| entry.title != title)
            .take(RECOMMENDATION_COUNT)
            .map(|(entry, score)| Recommendation {
                movie_id: entry.movie_id,
                title: entry.title.clone(),
                score,
            })
            .collect();

        tracing::debug!(
            title = %title,
            row,
            results = recommendations.len(),
            "Computed recommendations"
        );

        Ok(recommendations)
    }

    /// Catalog titles in row order
    pub fn titles(&self) -> Vec<&str> {
        self.artifacts
            .catalog
            .entries()
            .iter()
            .map(|entry| entry.title.as_str())
            .collect()
    }

    /// Catalog titles containing `query`, ignoring case, in row order
    pub fn search_titles(&self, query: &str) -> Vec<&str> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.titles();
        }

        self.artifacts
            .catalog
            .entries()
            .iter()
            .filter(|entry| entry.title.to_lowercase().contains(&needle))
            .map(|entry| entry.title.as_str())
            .collect()
    }
}
