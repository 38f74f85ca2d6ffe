//! Annotations API routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::error::{AppError, Result};
use crate::highlight::{CharIndex, HighlightColor};
use crate::models::{Annotation, AnnotationUpdate, Document, NewAnnotation};
use crate::routes::documents::find_document;
use crate::state::AppState;

/// Create the annotations router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_annotations).post(create_annotation))
        .route(
            "/:id",
            get(get_annotation)
                .patch(update_annotation)
                .delete(delete_annotation),
        )
}

/// Query parameters for listing annotations
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Comma separated document ids; all of the user's documents when absent
    document_id: Option<String>,
}

/// Request body for creating an annotation
#[derive(Debug, Deserialize)]
pub struct CreateAnnotationRequest {
    pub document_id: String,
    pub position_start: i64,
    pub position_end: i64,
    /// Filled from the document when omitted
    pub highlighted_text: Option<String>,
    #[serde(default)]
    pub content: String,
    pub color: Option<String>,
}

/// List annotations across documents
async fn list_annotations(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Annotation>>> {
    let annotations = match params.document_id {
        Some(ids) => {
            let document_ids: Vec<String> = ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
            state
                .store()
                .list_annotations(&document_ids, user.id())
                .await?
        }
        None => state.store().list_user_annotations(user.id()).await?,
    };
    Ok(Json(annotations))
}

/// Create a new annotation
async fn create_annotation(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateAnnotationRequest>,
) -> Result<(StatusCode, Json<Annotation>)> {
    let document = find_document(&state, &user, &req.document_id).await?;
    let default_color = state.config().documents.default_color;

    let data = build_annotation(&document, user.id(), req, default_color)?;
    let annotation = state.store().create_annotation(data).await?;
    Ok((StatusCode::CREATED, Json(annotation)))
}

/// Check a new annotation against the document's current content.
///
/// Offsets must satisfy `0 <= start <= end <= len(content)` and a supplied
/// `highlighted_text` must equal the text at those offsets.
fn build_annotation(
    document: &Document,
    user_id: &str,
    req: CreateAnnotationRequest,
    default_color: HighlightColor,
) -> Result<NewAnnotation> {
    let index = CharIndex::new(&document.content);
    let len = index.len() as i64;

    if req.position_start < 0 || req.position_start > req.position_end || req.position_end > len {
        return Err(AppError::BadRequest(format!(
            "Invalid range [{}, {}) for a document of {} characters",
            req.position_start, req.position_end, len
        )));
    }

    let expected = index.slice(req.position_start as usize, req.position_end as usize);
    let highlighted_text = match req.highlighted_text {
        Some(text) if text != expected => {
            return Err(AppError::BadRequest(
                "highlighted_text does not match the document at that range".to_string(),
            ))
        }
        Some(text) => text,
        None => expected.to_string(),
    };

    Ok(NewAnnotation {
        user_id: user_id.to_string(),
        document_id: document.id.clone(),
        content: req.content,
        highlighted_text,
        position_start: req.position_start,
        position_end: req.position_end,
        color: parse_color(req.color.as_deref())?
            .unwrap_or(default_color)
            .as_str()
            .to_string(),
    })
}

/// Parse an optional color name, rejecting names outside the supported set
fn parse_color(name: Option<&str>) -> Result<Option<HighlightColor>> {
    name.map(|n| {
        HighlightColor::from_name(n)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown highlight color: {}", n)))
    })
    .transpose()
}

/// Get a specific annotation
async fn get_annotation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Annotation>> {
    let annotation = state
        .store()
        .get_annotation(&id, user.id())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Annotation not found: {}", id)))?;
    Ok(Json(annotation))
}

/// Update the note or color of an annotation
async fn update_annotation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(data): Json<AnnotationUpdate>,
) -> Result<Json<Annotation>> {
    let update = AnnotationUpdate {
        content: data.content,
        color: parse_color(data.color.as_deref())?.map(|c| c.as_str().to_string()),
    };

    let annotation = state
        .store()
        .update_annotation(&id, user.id(), &update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Annotation not found: {}", id)))?;
    Ok(Json(annotation))
}

/// Delete an annotation
async fn delete_annotation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let deleted = state.store().delete_annotation(&id, user.id()).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Annotation not found: {}", id)))
    }
}
