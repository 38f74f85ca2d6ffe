//! Context Weaver Server
//!
//! Document annotation and cross-referencing. Users upload plain-text
//! documents, highlight passages with notes, and link documents with typed
//! connections.
//!
//! # Modules
//!
//! - `highlight`: offset mapping and selection translation over document text
//! - `store`: the storage interface and its SQLite implementation
//! - `routes`: the HTTP API

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod highlight;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let max_document_bytes = state.config().documents.max_document_bytes;

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/health", routes::health::router())
        .nest("/api/v1/health", routes::health::router())
        .nest("/api/v1/documents", routes::documents::router(max_document_bytes))
        .nest("/api/v1/annotations", routes::annotations::router())
        .nest("/api/v1/connections", routes::connections::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
