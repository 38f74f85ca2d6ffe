//! SQLite-backed store

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::Store;
use crate::db::{AnnotationRepository, ConnectionRepository, DocumentRepository};
use crate::error::Result;
use crate::models::{
    Annotation, AnnotationUpdate, Connection, Document, NewAnnotation, NewConnection, NewDocument,
};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>> {
        DocumentRepository::new(&self.pool).list(user_id).await
    }

    async fn get_document(&self, id: &str, user_id: &str) -> Result<Option<Document>> {
        DocumentRepository::new(&self.pool).get(id, user_id).await
    }

    async fn create_document(&self, document: NewDocument) -> Result<Document> {
        let created = DocumentRepository::new(&self.pool).create(&document).await?;
        tracing::info!(document_id = %created.id, size = created.size, "Created document");
        Ok(created)
    }

    async fn delete_document(&self, id: &str, user_id: &str) -> Result<bool> {
        DocumentRepository::new(&self.pool).delete(id, user_id).await
    }

    async fn list_annotations(
        &self,
        document_ids: &[String],
        user_id: &str,
    ) -> Result<Vec<Annotation>> {
        AnnotationRepository::new(&self.pool)
            .list_for_documents(document_ids, user_id)
            .await
    }

    async fn list_user_annotations(&self, user_id: &str) -> Result<Vec<Annotation>> {
        AnnotationRepository::new(&self.pool).list_for_user(user_id).await
    }

    async fn get_annotation(&self, id: &str, user_id: &str) -> Result<Option<Annotation>> {
        AnnotationRepository::new(&self.pool).get(id, user_id).await
    }

    async fn create_annotation(&self, annotation: NewAnnotation) -> Result<Annotation> {
        let created = AnnotationRepository::new(&self.pool).create(&annotation).await?;
        tracing::info!(
            annotation_id = %created.id,
            document_id = %created.document_id,
            "Created annotation"
        );
        Ok(created)
    }

    async fn update_annotation(
        &self,
        id: &str,
        user_id: &str,
        update: &AnnotationUpdate,
    ) -> Result<Option<Annotation>> {
        AnnotationRepository::new(&self.pool)
            .update(id, user_id, update)
            .await
    }

    async fn delete_annotation(&self, id: &str, user_id: &str) -> Result<bool> {
        AnnotationRepository::new(&self.pool).delete(id, user_id).await
    }

    async fn list_connections(&self, user_id: &str) -> Result<Vec<Connection>> {
        ConnectionRepository::new(&self.pool).list(user_id).await
    }

    async fn create_connection(&self, connection: NewConnection) -> Result<Connection> {
        ConnectionRepository::new(&self.pool).create(&connection).await
    }

    async fn delete_connection(&self, id: &str, user_id: &str) -> Result<bool> {
        ConnectionRepository::new(&self.pool).delete(id, user_id).await
    }
}
