use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::features::activity_logs::models::{
    ActivityAction, ActivityLog, ActivityStats, DocumentActivityCount,
};
use crate::features::documents::models::DocumentType;
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityLogResponseDto {
    pub id: i64,
    pub user_id: String,
    pub action: ActivityAction,
    pub document_type: DocumentType,
    pub document_id: Option<i64>,
    pub document_title: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityLog> for ActivityLogResponseDto {
    fn from(log: ActivityLog) -> Self {
        Self {
            id: log.id,
            user_id: log.user_id,
            action: log.action,
            document_type: log.document_type,
            document_id: log.document_id,
            document_title: log.document_title,
            ip_address: log.ip_address,
            user_agent: log.user_agent,
            details: log.details.map(|json| json.0),
            created_at: log.created_at,
        }
    }
}

/// Filters for the admin activity log listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ActivityLogQuery {
    /// Subject id of the acting user
    pub user_id: Option<String>,
    pub action: Option<ActivityAction>,
    pub document_type: Option<DocumentType>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl ActivityLogQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentActivityDto {
    pub document_type: DocumentType,
    pub document_id: i64,
    pub document_title: Option<String>,
    pub views: i64,
    pub downloads: i64,
}

impl From<DocumentActivityCount> for DocumentActivityDto {
    fn from(count: DocumentActivityCount) -> Self {
        Self {
            document_type: count.document_type,
            document_id: count.document_id,
            document_title: count.document_title,
            views: count.views,
            downloads: count.downloads,
        }
    }
}

/// Admin dashboard figures; periods start Monday 00:00 UTC and on the 1st of the month
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityStatsDto {
    pub recent_activity: Vec<ActivityLogResponseDto>,
    /// Most viewed documents, downloads breaking ties
    pub top_documents: Vec<DocumentActivityDto>,
    pub weekly_active_users: i64,
    pub monthly_downloads: i64,
    pub week_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
}

impl ActivityStatsDto {
    pub fn new(stats: ActivityStats, week_start: DateTime<Utc>, month_start: DateTime<Utc>) -> Self {
        Self {
            recent_activity: stats.recent.into_iter().map(Into::into).collect(),
            top_documents: stats.top_documents.into_iter().map(Into::into).collect(),
            weekly_active_users: stats.weekly_active_users,
            monthly_downloads: stats.monthly_downloads,
            week_start,
            month_start,
        }
    }
}
