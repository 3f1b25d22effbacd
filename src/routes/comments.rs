/**
 * Comment Routes
 * Global comment feed, newest first
 */
use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::{Deserialize, Serialize};

use crate::routes::{mutate, SharedPortfolio};
use crate::store::models::Comment;

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: Comment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// GET /api/comments
pub async fn list(State(state): State<SharedPortfolio>) -> impl IntoResponse {
    let portfolio = state.lock().await;
    let comments = portfolio.comments().to_vec();
    let total = comments.len();
    Json(CommentListResponse { comments, total })
}

/// POST /api/comments - requires an admin or reader session
pub async fn add(
    State(state): State<SharedPortfolio>,
    Json(payload): Json<CommentRequest>,
) -> Response {
    match mutate(&state, move |p| p.add_comment(&payload.text)).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(CommentResponse {
                comment: outcome.value,
                warning: outcome.persisted.warning(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
