//! Connections API routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::error::{AppError, Result};
use crate::models::{Connection, ConnectionType, NewConnection};
use crate::routes::documents::find_document;
use crate::state::AppState;

/// Create the connections router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_connections).post(create_connection))
        .route("/:id", delete(delete_connection))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Only connections starting or ending at this document
    document_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateConnectionRequest {
    pub source_document_id: String,
    pub target_document_id: String,
    pub connection_type: ConnectionType,
    pub source_annotation_id: Option<String>,
    pub description: Option<String>,
}

async fn list_connections(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Connection>>> {
    let mut connections = state.store().list_connections(user.id()).await?;
    if let Some(document_id) = params.document_id.as_deref() {
        connections.retain(|c| c.touches(document_id));
    }
    Ok(Json(connections))
}

async fn create_connection(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateConnectionRequest>,
) -> Result<(StatusCode, Json<Connection>)> {
    find_document(&state, &user, &req.source_document_id).await?;
    find_document(&state, &user, &req.target_document_id).await?;

    if let Some(annotation_id) = req.source_annotation_id.as_deref() {
        let annotation = state
            .store()
            .get_annotation(annotation_id, user.id())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Annotation not found: {}", annotation_id)))?;

        if annotation.document_id != req.source_document_id {
            return Err(AppError::BadRequest(
                "source_annotation_id must belong to the source document".to_string(),
            ));
        }
    }

    let description = req
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let connection = state
        .store()
        .create_connection(NewConnection {
            user_id: user.id().to_string(),
            source_document_id: req.source_document_id,
            target_document_id: req.target_document_id,
            connection_type: req.connection_type,
            source_annotation_id: req.source_annotation_id,
            description,
        })
        .await?;

    tracing::info!(
        connection_id = %connection.id,
        connection_type = %connection.connection_type,
        "Created connection"
    );
    Ok((StatusCode::CREATED, Json(connection)))
}

async fn delete_connection(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let deleted = state.store().delete_connection(&id, user.id()).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Connection not found: {}", id)))
    }
}
