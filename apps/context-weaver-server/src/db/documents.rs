//! Documents database operations

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Document, NewDocument};

/// Row as stored; tags are kept as a JSON array
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    user_id: String,
    title: String,
    content: String,
    tags_json: String,
    size: i64,
    file_name: Option<String>,
    created_at: String,
    updated_at: String,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document> {
        let tags: Vec<String> = serde_json::from_str(&self.tags_json)?;

        Ok(Document {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            content: self.content,
            tags,
            size: self.size,
            file_name: self.file_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Document repository
pub struct DocumentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DocumentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a document owned by the user
    pub async fn get(&self, id: &str, user_id: &str) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, user_id, title, content, tags_json, size, file_name,
                   created_at, updated_at
            FROM documents
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.into_document()).transpose()
    }

    /// List the user's documents, newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, user_id, title, content, tags_json, size, file_name,
                   created_at, updated_at
            FROM documents
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_document()).collect()
    }

    /// Create a new document
    pub async fn create(&self, data: &NewDocument) -> Result<Document> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let tags_json = serde_json::to_string(&data.tags)?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, user_id, title, content, tags_json, size, file_name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.user_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(&tags_json)
        .bind(data.content.len() as i64)
        .bind(&data.file_name)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(&id, &data.user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created document".to_string()))
    }

    /// Delete a document; annotations and connections cascade
    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
