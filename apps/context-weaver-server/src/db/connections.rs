//! Connections database operations

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Connection, ConnectionType, NewConnection};

#[derive(sqlx::FromRow)]
struct ConnectionRow {
    id: String,
    user_id: String,
    source_document_id: String,
    target_document_id: String,
    source_annotation_id: Option<String>,
    connection_type: String,
    description: Option<String>,
    created_at: String,
}

impl ConnectionRow {
    fn into_connection(self) -> Result<Connection> {
        let connection_type: ConnectionType = self
            .connection_type
            .parse()
            .map_err(AppError::Internal)?;

        Ok(Connection {
            id: self.id,
            user_id: self.user_id,
            source_document_id: self.source_document_id,
            target_document_id: self.target_document_id,
            connection_type,
            source_annotation_id: self.source_annotation_id,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

/// Connection repository
pub struct ConnectionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ConnectionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str, user_id: &str) -> Result<Option<Connection>> {
        let row = sqlx::query_as::<_, ConnectionRow>(
            r#"
            SELECT id, user_id, source_document_id, target_document_id,
                   source_annotation_id, connection_type, description, created_at
            FROM connections
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.into_connection()).transpose()
    }

    /// List the user's connections, newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Connection>> {
        let rows = sqlx::query_as::<_, ConnectionRow>(
            r#"
            SELECT id, user_id, source_document_id, target_document_id,
                   source_annotation_id, connection_type, description, created_at
            FROM connections
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_connection()).collect()
    }

    pub async fn create(&self, data: &NewConnection) -> Result<Connection> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO connections (id, user_id, source_document_id, target_document_id,
                                     source_annotation_id, connection_type, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.user_id)
        .bind(&data.source_document_id)
        .bind(&data.target_document_id)
        .bind(&data.source_annotation_id)
        .bind(data.connection_type.as_str())
        .bind(&data.description)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(&id, &data.user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created connection".to_string()))
    }

    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM connections WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
