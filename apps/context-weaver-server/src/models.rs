//! Records exchanged between the store, the highlight core and the API.
//!
//! Timestamps are RFC 3339 strings and ids are UUID v4 strings, matching what
//! the SQLite schema stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A plain-text document owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Raw text; the coordinate space of every annotation offset
    pub content: String,
    pub tags: Vec<String>,
    /// Size of `content` in bytes
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating a document
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub file_name: Option<String>,
}

/// A note anchored to the character range `[position_start, position_end)`
/// of a document.
///
/// Offsets are not re-validated after creation; consumers must treat them as
/// best-effort and clamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Annotation {
    pub id: String,
    pub user_id: String,
    pub document_id: String,
    /// The user's note, may be empty
    pub content: String,
    pub highlighted_text: String,
    pub position_start: i64,
    pub position_end: i64,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating an annotation
#[derive(Debug, Clone)]
pub struct NewAnnotation {
    pub user_id: String,
    pub document_id: String,
    pub content: String,
    pub highlighted_text: String,
    pub position_start: i64,
    pub position_end: i64,
    pub color: String,
}

/// In-place changes allowed on an annotation. Positions are immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationUpdate {
    pub content: Option<String>,
    pub color: Option<String>,
}

/// Kinds of relationship between two documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Supports,
    Contradicts,
    Extends,
    References,
    Related,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Supports => "supports",
            ConnectionType::Contradicts => "contradicts",
            ConnectionType::Extends => "extends",
            ConnectionType::References => "references",
            ConnectionType::Related => "related",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supports" => Ok(ConnectionType::Supports),
            "contradicts" => Ok(ConnectionType::Contradicts),
            "extends" => Ok(ConnectionType::Extends),
            "references" => Ok(ConnectionType::References),
            "related" => Ok(ConnectionType::Related),
            other => Err(format!("Unknown connection type: {}", other)),
        }
    }
}

/// A typed, directed relationship between two documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub user_id: String,
    pub source_document_id: String,
    pub target_document_id: String,
    pub connection_type: ConnectionType,
    /// Passage of the source document the connection was made from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_annotation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
}

/// Payload for creating a connection
#[derive(Debug, Clone)]
pub struct NewConnection {
    pub user_id: String,
    pub source_document_id: String,
    pub target_document_id: String,
    pub connection_type: ConnectionType,
    pub source_annotation_id: Option<String>,
    pub description: Option<String>,
}

impl Connection {
    /// Whether either end of the connection is the given document
    pub fn touches(&self, document_id: &str) -> bool {
        self.source_document_id == document_id || self.target_document_id == document_id
    }
}

/// List filters for documents: exact tag and case-insensitive substring
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilter {
    pub tag: Option<String>,
    #[serde(rename = "q")]
    pub search: Option<String>,
}

impl DocumentFilter {
    pub fn matches(&self, document: &Document) -> bool {
        if let Some(tag) = &self.tag {
            if !document.tags.iter().any(|t| t == tag) {
                return false;
            }
        }

        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                let needle = search.to_lowercase();
                return document.title.to_lowercase().contains(&needle)
                    || document.content.to_lowercase().contains(&needle);
            }
        }

        true
    }
}

/// Split a comma separated tag list, dropping blanks and duplicates
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
