/**
 * Authentication Routes
 * Admin login/reset/password change, reader gate, session and profile
 */
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::{Portfolio, ProfileUpdate, SignedIn};
use crate::ingest::{self, Upload};
use crate::routes::{error_response, mutate, SharedPortfolio, SuccessResponse};
use crate::store::models::User;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub profile_id: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub profile_id: String,
    pub notification_email: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReaderGateRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub username: String,
    pub email: String,
    pub notification_email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInResponse {
    pub success: bool,
    #[serde(flatten)]
    pub signed_in: SignedIn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub kind: String,
    pub is_admin: bool,
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<SharedPortfolio>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    if payload.profile_id.trim().is_empty() || payload.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Profile ID and password are required");
    }

    match mutate(&state, move |p| p.login(&payload.profile_id, &payload.password)).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SignedInResponse {
                success: true,
                warning: outcome.persisted.warning(),
                signed_in: outcome.value,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<SharedPortfolio>) -> Response {
    match mutate(&state, |p| Ok(p.logout())).await {
        Ok(persisted) => Json(SuccessResponse::from_persisted(&persisted)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/auth/forgot-password
/// Resets the admin secret to the default; there is no email round trip.
pub async fn forgot_password(
    State(state): State<SharedPortfolio>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Response {
    let reset = move |p: &mut Portfolio| {
        p.forgot_password(&payload.profile_id, &payload.notification_email)
    };
    match mutate(&state, reset).await {
        Ok(persisted) => Json(SuccessResponse::from_persisted(&persisted)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<SharedPortfolio>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Response {
    let change = move |p: &mut Portfolio| {
        p.change_password(
            &payload.current_password,
            &payload.new_password,
            &payload.confirm_password,
        )
    };
    match mutate(&state, change).await {
        Ok(persisted) => Json(SuccessResponse::from_persisted(&persisted)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/auth/reader
/// Email-only gate. Returns the item of a pending share link, if any.
pub async fn reader_gate(
    State(state): State<SharedPortfolio>,
    Json(payload): Json<ReaderGateRequest>,
) -> Response {
    match mutate(&state, move |p| p.enter_reader_gate(&payload.email)).await {
        Ok(outcome) => Json(SignedInResponse {
            success: true,
            warning: outcome.persisted.warning(),
            signed_in: outcome.value,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/session
pub async fn session(State(state): State<SharedPortfolio>) -> impl IntoResponse {
    let portfolio = state.lock().await;
    let session = portfolio.session();
    Json(SessionResponse {
        kind: session.kind().to_string(),
        is_admin: session.is_admin(),
        user: session.user().cloned(),
    })
}

/// GET /api/profile
/// Public profile shown in the about section.
pub async fn get_profile(State(state): State<SharedPortfolio>) -> impl IntoResponse {
    let portfolio = state.lock().await;
    Json(ProfileResponse {
        user: portfolio.admin_profile().clone(),
        warning: None,
    })
}

/// PATCH /api/profile
pub async fn update_profile(
    State(state): State<SharedPortfolio>,
    Json(payload): Json<ProfileRequest>,
) -> Response {
    let update = ProfileUpdate {
        username: payload.username,
        email: payload.email,
        notification_email: payload.notification_email,
    };
    match mutate(&state, move |p| p.update_profile(update, None)).await {
        Ok(outcome) => Json(ProfileResponse {
            user: outcome.value,
            warning: outcome.persisted.warning(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/profile/avatar (multipart, first file field)
pub async fn upload_avatar(
    State(state): State<SharedPortfolio>,
    mut multipart: Multipart,
) -> Response {
    if !state.lock().await.session().is_admin() {
        return error_response(StatusCode::UNAUTHORIZED, "Admin login required");
    }

    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, "No file provided"),
        Err(e) => {
            tracing::warn!(error = %e, "invalid avatar multipart body");
            return error_response(StatusCode::BAD_REQUEST, "Invalid multipart data");
        }
    };
    let file_name = field.file_name().unwrap_or("avatar").to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = match field.bytes().await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read avatar upload");
            return error_response(StatusCode::BAD_REQUEST, "Failed to process uploaded file.");
        }
    };

    let avatar = match ingest::embed(Upload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
    .await
    {
        Ok(url) => url,
        Err(e) => return crate::app::PortfolioError::from(e).into_response(),
    };

    match mutate(&state, move |p| p.update_avatar(avatar)).await {
        Ok(outcome) => Json(ProfileResponse {
            user: outcome.value,
            warning: outcome.persisted.warning(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{get, json, login_admin, post_json, test_app};
    use serde_json::json;

    #[tokio::test]
    async fn test_login_empty_fields_returns_bad_request() {
        let app = test_app();
        let (status, _) = post_json(
            &app,
            "/api/auth/login",
            &json!({ "profileId": "", "password": "password123" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials_returns_unauthorized() {
        let app = test_app();
        let (status, bytes) = post_json(
            &app,
            "/api/auth/login",
            &json!({ "profileId": "author_admin", "password": "wrongpassword" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json(&bytes)["error"], "Incorrect Profile ID or password.");
    }

    #[tokio::test]
    async fn test_login_then_session_is_admin() {
        let app = test_app();
        login_admin(&app).await;
        let (status, bytes) = get(&app, "/api/session").await;
        assert_eq!(status, StatusCode::OK);
        let body: SessionResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.is_admin);
        assert_eq!(body.user.unwrap().id, "author_admin");
    }

    #[tokio::test]
    async fn test_logout_returns_success() {
        let app = test_app();
        login_admin(&app).await;
        let (status, bytes) = post_json(&app, "/api/auth/logout", &json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["success"], true);
        let (_, bytes) = get(&app, "/api/session").await;
        assert_eq!(json(&bytes)["kind"], "anonymous");
    }

    #[tokio::test]
    async fn test_forgot_password_requires_notification_email() {
        let app = test_app();
        let (status, _) = post_json(
            &app,
            "/api/auth/forgot-password",
            &json!({ "profileId": "author_admin", "notificationEmail": "author@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = post_json(
            &app,
            "/api/auth/forgot-password",
            &json!({ "profileId": "author_admin", "notificationEmail": "alerts@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_change_password_requires_admin_and_length() {
        let app = test_app();
        let body = json!({
            "currentPassword": "password123",
            "newPassword": "short",
            "confirmPassword": "short"
        });
        let (status, _) = post_json(&app, "/api/auth/change-password", &body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        login_admin(&app).await;
        let (status, bytes) = post_json(&app, "/api/auth/change-password", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json(&bytes)["error"],
            "Password must be at least 8 characters long."
        );
    }

    #[tokio::test]
    async fn test_reader_gate_validates_email() {
        let app = test_app();
        let (status, _) =
            post_json(&app, "/api/auth/reader", &json!({ "email": "not-an-email" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, bytes) =
            post_json(&app, "/api/auth/reader", &json!({ "email": "a@b.co" })).await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&bytes);
        assert_eq!(body["user"]["email"], "a@b.co");
        assert!(body["pendingItem"].is_null());
    }

    #[tokio::test]
    async fn test_profile_update_requires_admin() {
        let app = test_app();
        let update = json!({
            "username": "Pen Name",
            "email": "pen@example.com",
            "notificationEmail": "pen-alerts@example.com"
        });
        let req = axum::http::Request::patch("/api/profile")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(update.to_string()))
            .unwrap();
        let (status, _) = crate::routes::test_support::send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        login_admin(&app).await;
        let req = axum::http::Request::patch("/api/profile")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(update.to_string()))
            .unwrap();
        let (status, bytes) = crate::routes::test_support::send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&bytes)["user"]["username"], "Pen Name");
        assert_eq!(json(&bytes)["user"]["id"], "author_admin");
    }

    #[tokio::test]
    async fn test_padded_credentials_are_not_trimmed() {
        let app = test_app();
        let (status, _) = post_json(
            &app,
            "/api/auth/login",
            &json!({ "profileId": "  author_admin ", "password": "password123" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (_, bytes) = get(&app, "/api/session").await;
        assert_eq!(json(&bytes)["kind"], "anonymous");

        let (status, _) = post_json(
            &app,
            "/api/auth/forgot-password",
            &json!({ "profileId": "author_admin", "notificationEmail": " alerts@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    fn avatar_request(bytes: &[u8]) -> axum::http::Request<axum::body::Body> {
        let mut body = b"--AVATARBOUNDARY\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"me.gif\"\r\nContent-Type: application/octet-stream\r\n\r\n".to_vec();
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n--AVATARBOUNDARY--\r\n");
        axum::http::Request::post("/api/profile/avatar")
            .header("content-type", "multipart/form-data; boundary=AVATARBOUNDARY")
            .body(axum::body::Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_avatar_upload_is_embedded_into_profile() {
        let app = test_app();
        let gif = b"GIF89a\x01\x00";
        let (status, _) = crate::routes::test_support::send(&app, avatar_request(gif)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        login_admin(&app).await;
        let (status, bytes) = crate::routes::test_support::send(&app, avatar_request(gif)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json(&bytes)["user"]["avatar"]
            .as_str()
            .unwrap()
            .starts_with("data:image/gif;base64,"));

        let (_, bytes) = get(&app, "/api/profile").await;
        assert!(json(&bytes)["user"]["avatar"]
            .as_str()
            .unwrap()
            .starts_with("data:image/gif;base64,"));
    }

    #[tokio::test]
    async fn test_empty_avatar_is_rejected() {
        let app = test_app();
        login_admin(&app).await;
        let (status, bytes) = crate::routes::test_support::send(&app, avatar_request(b"")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&bytes)["message"], "Failed to process uploaded file.");
    }
}
