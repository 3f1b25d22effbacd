/**
 * Content Routes
 * Listing, admin add/delete, and backup/restore of the three collections
 */
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::app::{PortfolioError, RestoreOutcome};
use crate::content::{Confirmation, DeleteOutcome, NewContent, DELETE_PROMPT, RESTORE_PROMPT};
use crate::ingest::{self, Upload};
use crate::routes::{
    confirmation_required, error_response, mutate, ConfirmQuery, SharedPortfolio,
    SuccessResponse,
};
use crate::store::models::{ContentItem, ContentType};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentListResponse {
    pub stories: Vec<ContentItem>,
    pub documentaries: Vec<ContentItem>,
    pub articles: Vec<ContentItem>,
    /// Hero slider feed: stories, documentaries, then articles
    pub slides: Vec<ContentItem>,
}

#[derive(Debug, Serialize)]
pub struct BucketResponse {
    pub items: Vec<ContentItem>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub item: ContentItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

fn parse_type(raw: &str) -> Result<ContentType, Response> {
    raw.parse::<ContentType>()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/content
pub async fn list_all(State(state): State<SharedPortfolio>) -> impl IntoResponse {
    let portfolio = state.lock().await;
    let content = portfolio.content();
    Json(ContentListResponse {
        stories: content.items(ContentType::Story).to_vec(),
        documentaries: content.items(ContentType::Documentary).to_vec(),
        articles: content.items(ContentType::Article).to_vec(),
        slides: content.all().cloned().collect(),
    })
}

/// GET /api/content/{type}
pub async fn list_bucket(
    State(state): State<SharedPortfolio>,
    Path(content_type): Path<String>,
) -> Response {
    let content_type = match parse_type(&content_type) {
        Ok(t) => t,
        Err(response) => return response,
    };
    let portfolio = state.lock().await;
    let items = portfolio.content().items(content_type).to_vec();
    let total = items.len();
    Json(BucketResponse { items, total }).into_response()
}

/// Form fields collected from the admin dashboard upload.
#[derive(Default)]
struct ContentForm {
    content_type: Option<String>,
    title: Option<String>,
    tagline: Option<String>,
    description: Option<String>,
    tags: Option<String>,
    cover_image: Option<Upload>,
    content_file: Option<Upload>,
}

async fn read_form(multipart: &mut Multipart) -> Result<ContentForm, Response> {
    let mut form = ContentForm::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "invalid content multipart body");
                return Err(error_response(StatusCode::BAD_REQUEST, "Invalid multipart data"));
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "coverImage" | "contentFile" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    tracing::warn!(field = %name, error = %e, "failed to read upload");
                    error_response(StatusCode::BAD_REQUEST, "Failed to process uploaded file.")
                })?;
                // An empty file input still sends a part; treat it as absent.
                if bytes.is_empty() && file_name.is_empty() {
                    continue;
                }
                let upload = Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                };
                if name == "coverImage" {
                    form.cover_image = Some(upload);
                } else {
                    form.content_file = Some(upload);
                }
            }
            _ => {
                let text = field.text().await.map_err(|_| {
                    error_response(StatusCode::BAD_REQUEST, "Invalid multipart data")
                })?;
                match name.as_str() {
                    "type" => form.content_type = Some(text),
                    "title" => form.title = Some(text),
                    "tagline" => form.tagline = Some(text),
                    "description" => form.description = Some(text),
                    "tags" => form.tags = Some(text),
                    other => tracing::debug!(field = %other, "ignoring unknown form field"),
                }
            }
        }
    }
    Ok(form)
}

/// POST /api/content (multipart, admin)
pub async fn create(State(state): State<SharedPortfolio>, mut multipart: Multipart) -> Response {
    if !state.lock().await.session().is_admin() {
        return error_response(StatusCode::UNAUTHORIZED, "Admin login required");
    }

    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let content_type = match form.content_type.as_deref().map(parse_type) {
        Some(Ok(t)) => t,
        Some(Err(response)) => return response,
        None => return error_response(StatusCode::BAD_REQUEST, "Content type is required"),
    };
    let title = form.title.unwrap_or_default();
    if title.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Title is required");
    }
    let Some(cover) = form.cover_image else {
        return error_response(StatusCode::BAD_REQUEST, "Please upload a cover image.");
    };

    // Embed files before taking the lock; this is the only step that suspends.
    let cover_image = match ingest::embed(cover).await {
        Ok(url) => url,
        Err(e) => return PortfolioError::from(e).into_response(),
    };
    let content_file = match form.content_file {
        Some(upload) => {
            let name = upload.file_name.clone();
            match ingest::embed(upload).await {
                Ok(url) => Some((name, url)),
                Err(e) => return PortfolioError::from(e).into_response(),
            }
        }
        None => None,
    };

    let item = NewContent {
        content_type,
        title: title.trim().to_string(),
        tagline: form.tagline,
        description: form.description.unwrap_or_default(),
        tags: NewContent::parse_tags(form.tags.as_deref().unwrap_or_default()),
    }
    .into_item(cover_image, content_file);

    match mutate(&state, move |p| p.add_content(item)).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(ContentResponse {
                item: outcome.value,
                warning: outcome.persisted.warning(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /api/content/{type}/{id}?confirm=true (admin)
pub async fn delete(
    State(state): State<SharedPortfolio>,
    Path((content_type, id)): Path<(String, String)>,
    Query(query): Query<ConfirmQuery>,
) -> Response {
    let content_type = match parse_type(&content_type) {
        Ok(t) => t,
        Err(response) => return response,
    };
    let confirmation = Confirmation::from(query.confirm);
    match mutate(&state, move |p| p.delete_content(&id, content_type, confirmation)).await {
        Ok(outcome) => match outcome.value {
            DeleteOutcome::Declined => confirmation_required(DELETE_PROMPT),
            DeleteOutcome::NotFound => Json(DeleteResponse {
                success: true,
                deleted: false,
                warning: None,
            })
            .into_response(),
            DeleteOutcome::Removed(_) => Json(DeleteResponse {
                success: true,
                deleted: true,
                warning: outcome.persisted.warning(),
            })
            .into_response(),
        },
        Err(e) => e.into_response(),
    }
}

/// GET /api/content/{type}/{id}/file - the attached content file, decoded
pub async fn download_file(
    State(state): State<SharedPortfolio>,
    Path((content_type, id)): Path<(String, String)>,
) -> Response {
    let content_type = match parse_type(&content_type) {
        Ok(t) => t,
        Err(response) => return response,
    };
    let attachment = {
        let portfolio = state.lock().await;
        portfolio
            .content()
            .items(content_type)
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| {
                Some((item.content_file_name.clone()?, item.content_file_url.clone()?))
            })
    };
    let Some((file_name, url)) = attachment else {
        return error_response(StatusCode::NOT_FOUND, "Content file not found");
    };

    let (mime, bytes) = match ingest::decode_data_url(&url) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::error!(id = %id, error = %e, "stored content file is not a data URL");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Content file is corrupt");
        }
    };
    (
        [
            (header::CONTENT_TYPE, mime),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", header_safe(&file_name)),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Printable ASCII only, without quotes.
fn header_safe(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"') || c == ' ' { c } else { '_' })
        .collect()
}

/// GET /api/backup (admin) - downloadable JSON snapshot
pub async fn backup(State(state): State<SharedPortfolio>) -> Response {
    let portfolio = state.lock().await;
    match portfolio.export_all() {
        Ok(backup) => {
            tracing::info!(filename = %backup.filename, "backup exported");
            (
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", backup.filename),
                    ),
                ],
                backup.body,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/backup/restore?confirm=true (admin) - raw backup JSON body
pub async fn restore(
    State(state): State<SharedPortfolio>,
    Query(query): Query<ConfirmQuery>,
    body: String,
) -> Response {
    let confirmation = Confirmation::from(query.confirm);
    match mutate(&state, move |p| p.restore_from_text(&body, confirmation)).await {
        Ok(outcome) => match outcome.value {
            RestoreOutcome::Declined => confirmation_required(RESTORE_PROMPT),
            RestoreOutcome::Restored => {
                Json(SuccessResponse::from_persisted(&outcome.persisted)).into_response()
            }
        },
        Err(e) => e.into_response(),
    }
}
