/**
 * Share Routes
 * `#content/<id>` links: build them, and resolve them against the session
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::routes::{error_response, SharedPortfolio};

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResolveRequest {
    pub fragment: String,
}

/// GET /api/share/{id}
pub async fn share_url(State(state): State<SharedPortfolio>, Path(id): Path<String>) -> Response {
    match state.lock().await.share_url(&id) {
        Some(url) => Json(ShareUrlResponse { url }).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Content not found"),
    }
}

/// POST /api/share/resolve
/// Anonymous viewers get `gateFirst`; the item opens after the reader gate.
pub async fn resolve(
    State(state): State<SharedPortfolio>,
    Json(payload): Json<ResolveRequest>,
) -> impl IntoResponse {
    let resolution = state.lock().await.resolve_share(&payload.fragment);
    Json(resolution)
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, json, post_json, test_app};
    use axum::http::StatusCode;
    use serde_json::json;

    async fn seed(app: &axum::Router) -> String {
        crate::routes::test_support::login_admin(app).await;
        let backup = json!({
            "stories": [{
                "id": "story-1-abcdef",
                "type": "STORY",
                "title": "Night Train",
                "coverImage": "data:image/png;base64,AA=="
            }],
            "documentaries": [],
            "articles": []
        });
        let req = axum::http::Request::post("/api/backup/restore?confirm=true")
            .body(axum::body::Body::from(backup.to_string()))
            .unwrap();
        let (status, _) = crate::routes::test_support::send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        post_json(app, "/api/auth/logout", &json!({})).await;
        "story-1-abcdef".to_string()
    }

    #[tokio::test]
    async fn test_share_url_for_known_item() {
        let app = test_app();
        let id = seed(&app).await;
        let (status, bytes) = get(&app, &format!("/api/share/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["url"], "https://author.site/#content/story-1-abcdef");

        let (status, _) = get(&app, "/api/share/story-missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_anonymous_resolve_defers_to_reader_gate() {
        let app = test_app();
        seed(&app).await;
        let (status, bytes) = post_json(
            &app,
            "/api/share/resolve",
            &json!({ "fragment": "#content/story-1-abcdef" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["action"], "gateFirst");

        let (_, bytes) = post_json(&app, "/api/auth/reader", &json!({ "email": "r@x.io" })).await;
        assert_eq!(json(&bytes)["pendingItem"]["title"], "Night Train");

        let (_, bytes) = post_json(
            &app,
            "/api/share/resolve",
            &json!({ "fragment": "#content/story-1-abcdef" }),
        )
        .await;
        assert_eq!(json(&bytes)["action"], "open");
        assert_eq!(json(&bytes)["item"]["id"], "story-1-abcdef");
    }

    #[tokio::test]
    async fn test_unknown_fragment_is_not_found() {
        let app = test_app();
        let (_, bytes) =
            post_json(&app, "/api/share/resolve", &json!({ "fragment": "#about" })).await;
        assert_eq!(json(&bytes)["action"], "notFound");
    }
}
