use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow, Type};
use utoipa::ToSchema;

use crate::features::documents::models::DocumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "activity_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    View,
    Create,
    Update,
    Delete,
    Download,
    Search,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityAction::View => write!(f, "view"),
            ActivityAction::Create => write!(f, "create"),
            ActivityAction::Update => write!(f, "update"),
            ActivityAction::Delete => write!(f, "delete"),
            ActivityAction::Download => write!(f, "download"),
            ActivityAction::Search => write!(f, "search"),
        }
    }
}

/// Append-only audit row; the title is a snapshot taken when the row was written
#[derive(Debug, Clone, FromRow)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: String,
    pub action: ActivityAction,
    pub document_type: DocumentType,
    pub document_id: Option<i64>,
    pub document_title: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<Json<Value>>,
    pub created_at: DateTime<Utc>,
}

/// View and download totals of one document
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DocumentActivityCount {
    pub document_type: DocumentType,
    pub document_id: i64,
    /// Latest title snapshot seen in the log
    pub document_title: Option<String>,
    pub views: i64,
    pub downloads: i64,
}

#[derive(Debug, Clone)]
pub struct ActivityStats {
    pub recent: Vec<ActivityLog>,
    pub top_documents: Vec<DocumentActivityCount>,
    /// Distinct users with any activity since the start of the week
    pub weekly_active_users: i64,
    /// Downloads since the start of the month
    pub monthly_downloads: i64,
}

#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub user_id: String,
    pub action: ActivityAction,
    pub document_type: DocumentType,
    pub document_id: Option<i64>,
    pub document_title: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<Value>,
}
