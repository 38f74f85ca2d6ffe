//! Storage collaborator
//!
//! The highlight core only needs a small tabular interface. [`Store`] is that
//! interface; [`SqliteStore`] implements it on top of the sqlx repositories.
//!
//! Every operation is scoped to the caller's `user_id`: rows owned by other
//! users are invisible and cannot be deleted.

mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Annotation, AnnotationUpdate, Connection, Document, NewAnnotation, NewConnection, NewDocument,
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>>;

    async fn get_document(&self, id: &str, user_id: &str) -> Result<Option<Document>>;

    async fn create_document(&self, document: NewDocument) -> Result<Document>;

    /// Returns `false` when no such document exists for the user
    async fn delete_document(&self, id: &str, user_id: &str) -> Result<bool>;

    /// Annotations on any of `document_ids`. An empty id list yields nothing.
    async fn list_annotations(&self, document_ids: &[String], user_id: &str)
        -> Result<Vec<Annotation>>;

    /// Every annotation the user owns, across all of their documents
    async fn list_user_annotations(&self, user_id: &str) -> Result<Vec<Annotation>>;

    async fn get_annotation(&self, id: &str, user_id: &str) -> Result<Option<Annotation>>;

    async fn create_annotation(&self, annotation: NewAnnotation) -> Result<Annotation>;

    async fn update_annotation(
        &self,
        id: &str,
        user_id: &str,
        update: &AnnotationUpdate,
    ) -> Result<Option<Annotation>>;

    async fn delete_annotation(&self, id: &str, user_id: &str) -> Result<bool>;

    async fn list_connections(&self, user_id: &str) -> Result<Vec<Connection>>;

    async fn create_connection(&self, connection: NewConnection) -> Result<Connection>;

    async fn delete_connection(&self, id: &str, user_id: &str) -> Result<bool>;
}
