//! Documents API routes
//!
//! Besides CRUD, this is where a document is rendered with its highlights and
//! where selections made in that rendering are translated back into offsets.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::error::{AppError, Result};
use crate::highlight::{
    self, render_html, DocumentView, HtmlOptions, SelectionPoint, SelectionRange, Segment,
    UserSelection,
};
use crate::models::{parse_tags, Annotation, Document, DocumentFilter, NewDocument};
use crate::state::AppState;

/// Room for multipart boundaries, JSON keys and the small fields next to the content
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Worst case JSON string escaping: one control byte becomes `\u00XX`
const JSON_ESCAPE_FACTOR: usize = 6;

/// Create the documents router.
///
/// Body limits only keep transport sizes bounded. The document size itself is
/// checked on the decoded content by `new_document`.
pub fn router(max_document_bytes: usize) -> Router<AppState> {
    let json_limit = max_document_bytes
        .saturating_mul(JSON_ESCAPE_FACTOR)
        .saturating_add(BODY_OVERHEAD_BYTES);
    let upload_limit = max_document_bytes.saturating_add(BODY_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/",
            get(list_documents)
                .post(create_document)
                .layer(DefaultBodyLimit::max(json_limit)),
        )
        .route(
            "/upload",
            post(upload_document).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/:id", get(get_document).delete(delete_document))
        .route("/:id/render", get(render_document))
        .route("/:id/selection", post(translate_selection))
        .route("/:id/annotations", get(list_document_annotations))
}

/// Request body for creating a document
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validate and normalize a document before it is stored
fn new_document(
    user_id: &str,
    title: &str,
    content: String,
    tags: Vec<String>,
    file_name: Option<String>,
    max_bytes: usize,
) -> Result<NewDocument> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Document title is required".to_string()));
    }
    if content.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "Document is {} bytes, limit is {}",
            content.len(),
            max_bytes
        )));
    }

    Ok(NewDocument {
        user_id: user_id.to_string(),
        title: title.to_string(),
        content,
        tags: parse_tags(&tags.join(",")),
        file_name,
    })
}

/// List documents, optionally filtered by `tag` and `q`
async fn list_documents(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<DocumentFilter>,
) -> Result<Json<Vec<Document>>> {
    let documents = state
        .store()
        .list_documents(user.id())
        .await?
        .into_iter()
        .filter(|d| filter.matches(d))
        .collect();
    Ok(Json(documents))
}

/// Create a document from a JSON body
async fn create_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<Document>)> {
    let max_bytes = state.config().documents.max_document_bytes;
    let data = new_document(user.id(), &req.title, req.content, req.tags, None, max_bytes)?;
    let document = state.store().create_document(data).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Create a document from a multipart upload.
///
/// Fields: `file` (required, UTF-8 text), `title` (defaults to the file name
/// without extension), `tags` (comma separated).
async fn upload_document(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Document>)> {
    let mut title: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut file: Option<(Option<String>, String)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                let content = String::from_utf8(bytes.to_vec())?;
                file = Some((file_name, content));
            }
            "title" => title = Some(field.text().await?),
            "tags" => tags = parse_tags(&field.text().await?),
            other => tracing::debug!("Ignoring upload field: {}", other),
        }
    }

    let (file_name, content) =
        file.ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;

    let title = title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| file_name.as_deref().map(title_from_file_name))
        .unwrap_or_else(|| "Untitled".to_string());

    let max_bytes = state.config().documents.max_document_bytes;
    let data = new_document(user.id(), &title, content, tags, file_name, max_bytes)?;
    let document = state.store().create_document(data).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

fn title_from_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}

/// Get a specific document
async fn get_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Document>> {
    let document = find_document(&state, &user, &id).await?;
    Ok(Json(document))
}

/// Delete a document together with its annotations and connections
async fn delete_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let deleted = state.store().delete_document(&id, user.id()).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Document not found: {}", id)))
    }
}

/// List annotations of one document
async fn list_document_annotations(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Annotation>>> {
    let (_, annotations) = load_with_annotations(&state, &user, &id).await?;
    Ok(Json(annotations))
}

#[derive(Debug, Deserialize)]
pub struct RenderParams {
    format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse<'a> {
    pub document_id: &'a str,
    /// Document length in characters
    pub length: usize,
    pub segments: Vec<Segment<'a>>,
}

/// Render a document with its highlights, as JSON segments or HTML
async fn render_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Query(params): Query<RenderParams>,
) -> Result<Response> {
    let (document, annotations) = load_with_annotations(&state, &user, &id).await?;
    let segments = highlight::render(&document.content, &annotations);

    let response = match params.format.as_deref() {
        Some("html") => Html(render_html(&segments, &HtmlOptions::default())).into_response(),
        None | Some("json") => Json(RenderResponse {
            document_id: &document.id,
            length: highlight::char_len(&document.content),
            segments,
        })
        .into_response(),
        Some(other) => {
            return Err(AppError::BadRequest(format!("Unknown render format: {}", other)))
        }
    };

    Ok(response)
}

/// A selection made in the rendering returned by `/render`
#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    /// Document whose view produced the event; defaults to the path document
    pub document_id: Option<String>,
    pub anchor: SelectionPoint,
    pub focus: SelectionPoint,
}

/// Translate a selection into document offsets.
///
/// Responds with `null` when the selection is empty or came from another
/// document's view.
async fn translate_selection(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<Option<SelectionRange>>> {
    let (document, annotations) = load_with_annotations(&state, &user, &id).await?;
    let segments = highlight::render(&document.content, &annotations);
    let view = DocumentView::from_segments(document.id.as_str(), &segments);

    let selection = UserSelection {
        document_id: req.document_id.unwrap_or(id),
        anchor: req.anchor,
        focus: req.focus,
    };

    Ok(Json(highlight::translate(&view, &selection)))
}

pub(crate) async fn find_document(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<Document> {
    state
        .store()
        .get_document(id, user.id())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document not found: {}", id)))
}

/// One snapshot of a document and its annotations, as used for a render cycle
async fn load_with_annotations(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<(Document, Vec<Annotation>)> {
    let document = find_document(state, user, id).await?;
    let annotations = state
        .store()
        .list_annotations(&[document.id.clone()], user.id())
        .await?;
    Ok((document, annotations))
}
