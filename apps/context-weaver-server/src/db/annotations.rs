//! Annotations database operations

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Annotation, AnnotationUpdate, NewAnnotation};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, document_id, content, highlighted_text,
           position_start, position_end, color, created_at, updated_at
    FROM annotations
"#;

/// Annotation repository
pub struct AnnotationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AnnotationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an annotation owned by the user
    pub async fn get(&self, id: &str, user_id: &str) -> Result<Option<Annotation>> {
        let sql = format!("{} WHERE id = ? AND user_id = ?", SELECT_COLUMNS);
        let annotation = sqlx::query_as::<_, Annotation>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(annotation)
    }

    /// List the user's annotations on any of the given documents,
    /// ordered by position then creation time
    pub async fn list_for_documents(
        &self,
        document_ids: &[String],
        user_id: &str,
    ) -> Result<Vec<Annotation>> {
        if document_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; document_ids.len()].join(", ");
        let sql = format!(
            "{} WHERE user_id = ? AND document_id IN ({}) \
             ORDER BY position_start ASC, created_at ASC",
            SELECT_COLUMNS, placeholders
        );

        let mut query = sqlx::query_as::<_, Annotation>(&sql).bind(user_id);
        for document_id in document_ids {
            query = query.bind(document_id);
        }

        Ok(query.fetch_all(self.pool).await?)
    }

    /// List every annotation the user owns, grouped by document
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Annotation>> {
        let sql = format!(
            "{} WHERE user_id = ? ORDER BY document_id ASC, position_start ASC, created_at ASC",
            SELECT_COLUMNS
        );
        let annotations = sqlx::query_as::<_, Annotation>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(annotations)
    }

    /// Create a new annotation
    pub async fn create(&self, data: &NewAnnotation) -> Result<Annotation> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO annotations (id, user_id, document_id, content, highlighted_text,
                                     position_start, position_end, color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.user_id)
        .bind(&data.document_id)
        .bind(&data.content)
        .bind(&data.highlighted_text)
        .bind(data.position_start)
        .bind(data.position_end)
        .bind(&data.color)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(&id, &data.user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created annotation".to_string()))
    }

    /// Update the note and/or color of an annotation
    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        data: &AnnotationUpdate,
    ) -> Result<Option<Annotation>> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE annotations
            SET content = COALESCE(?, content),
                color = COALESCE(?, color),
                updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&data.content)
        .bind(&data.color)
        .bind(&now)
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id, user_id).await
    }

    /// Delete an annotation
    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
