/**
 * Settings Routes
 * Footer social links
 */
use axum::{extract::State, response::{IntoResponse, Response}, Json};
use serde::Serialize;

use crate::routes::{mutate, SharedPortfolio};
use crate::store::models::SocialLinks;

#[derive(Debug, Serialize)]
pub struct SocialLinksResponse {
    #[serde(flatten)]
    pub links: SocialLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// GET /api/settings/social
pub async fn get_social(State(state): State<SharedPortfolio>) -> impl IntoResponse {
    Json(state.lock().await.social_links().clone())
}

/// PUT /api/settings/social (admin) - replaces all five links
pub async fn update_social(
    State(state): State<SharedPortfolio>,
    Json(links): Json<SocialLinks>,
) -> Response {
    match mutate(&state, move |p| p.update_social_links(links)).await {
        Ok(outcome) => Json(SocialLinksResponse {
            links: outcome.value,
            warning: outcome.persisted.warning(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}
