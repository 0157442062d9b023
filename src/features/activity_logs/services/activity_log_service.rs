use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc};
use serde_json::Value;

use crate::core::error::Result;
use crate::core::extractor::RequestContext;
use crate::features::activity_logs::dtos::{
    ActivityLogQuery, ActivityLogResponseDto, ActivityStatsDto,
};
use crate::features::activity_logs::models::{ActivityAction, NewActivityLog};
use crate::features::activity_logs::repositories::{
    ActivityLogFilter, ActivityLogRepository, StatsWindow,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::models::DocumentType;
use crate::features::documents::repositories::DocumentRepository;

const STATS_RECENT_LIMIT: i64 = 5;
const STATS_TOP_LIMIT: i64 = 5;

/// Monday 00:00 UTC of the week and 00:00 UTC on the 1st of the month containing `now`
pub(crate) fn period_starts(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let first_of_month = today - Days::new(u64::from(today.day0()));
    (
        Utc.from_utc_datetime(&monday.and_time(NaiveTime::MIN)),
        Utc.from_utc_datetime(&first_of_month.and_time(NaiveTime::MIN)),
    )
}

/// What happened to which document
#[derive(Debug, Clone)]
pub struct Activity {
    pub action: ActivityAction,
    pub document_type: DocumentType,
    pub document_id: Option<i64>,
    pub document_title: Option<String>,
    pub details: Option<Value>,
}

impl Activity {
    pub fn new(action: ActivityAction, document_type: DocumentType) -> Self {
        Self {
            action,
            document_type,
            document_id: None,
            document_title: None,
            details: None,
        }
    }

    pub fn document(mut self, id: i64) -> Self {
        self.document_id = Some(id);
        self
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.document_title = Some(title.into());
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

pub struct ActivityLogService {
    repo: Arc<dyn ActivityLogRepository>,
    documents: Arc<dyn DocumentRepository>,
}

impl ActivityLogService {
    pub fn new(repo: Arc<dyn ActivityLogRepository>, documents: Arc<dyn DocumentRepository>) -> Self {
        Self { repo, documents }
    }

    /// Write one log row. Returns `false` without writing when there is no user.
    pub async fn record(
        &self,
        user: Option<&AuthenticatedUser>,
        ctx: Option<&RequestContext>,
        activity: Activity,
    ) -> Result<bool> {
        let Some(user) = user else {
            return Ok(false);
        };

        let entry = NewActivityLog {
            user_id: user.sub.clone(),
            action: activity.action,
            document_type: activity.document_type,
            document_id: activity.document_id,
            document_title: activity.document_title,
            ip_address: ctx.and_then(|c| c.ip_address.clone()),
            user_agent: ctx.and_then(|c| c.user_agent.clone()),
            details: activity.details,
        };

        let log = self.repo.append(entry).await?;
        tracing::debug!(
            "Activity logged: user={} action={} type={} document={:?}",
            log.user_id,
            log.action,
            log.document_type,
            log.document_id
        );
        Ok(true)
    }

    /// Log `activity`, then run `operation` and return its output unchanged.
    ///
    /// A missing title is looked up from the document when an id is given.
    /// Lookup and logging failures are logged and otherwise ignored.
    pub async fn track<F, T>(
        &self,
        user: Option<&AuthenticatedUser>,
        ctx: Option<&RequestContext>,
        mut activity: Activity,
        operation: F,
    ) -> T
    where
        F: Future<Output = T>,
    {
        if user.is_some() && activity.document_title.is_none() {
            if let Some(id) = activity.document_id {
                activity.document_title = self.lookup_title(activity.document_type, id).await;
            }
        }

        if let Err(e) = self.record(user, ctx, activity).await {
            tracing::warn!("Failed to write activity log: {}", e);
        }

        operation.await
    }

    async fn lookup_title(&self, kind: DocumentType, id: i64) -> Option<String> {
        match self.documents.find_by_id(kind, id).await {
            Ok(doc) => doc.map(|d| d.title),
            Err(e) => {
                tracing::warn!("Could not resolve title of {} document {}: {}", kind, id, e);
                None
            }
        }
    }

    pub async fn list(&self, query: &ActivityLogQuery) -> Result<(Vec<ActivityLogResponseDto>, i64)> {
        let pagination = query.pagination();
        let filter = ActivityLogFilter {
            user_id: query.user_id.clone(),
            action: query.action,
            document_type: query.document_type,
            limit: pagination.limit(),
            offset: pagination.offset(),
        };

        let (logs, total) = self.repo.list(&filter).await?;
        Ok((logs.into_iter().map(Into::into).collect(), total))
    }

    pub async fn stats(&self) -> Result<ActivityStatsDto> {
        self.stats_at(Utc::now()).await
    }

    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<ActivityStatsDto> {
        let (week_start, month_start) = period_starts(now);
        let stats = self
            .repo
            .stats(&StatsWindow {
                week_start,
                month_start,
                recent_limit: STATS_RECENT_LIMIT,
                top_limit: STATS_TOP_LIMIT,
            })
            .await?;
        Ok(ActivityStatsDto::new(stats, week_start, month_start))
    }
}
