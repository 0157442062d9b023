//! In-memory fakes and fixtures shared by unit and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use tokio::sync::RwLock;

use crate::core::config::PreviewConfig;
use crate::core::error::{AppError, Result};
use crate::features::activity_logs::models::{
    ActivityAction, ActivityLog, ActivityStats, DocumentActivityCount, NewActivityLog,
};
use crate::features::activity_logs::repositories::{
    ActivityLogFilter, ActivityLogRepository, StatsWindow,
};
use crate::features::activity_logs::ActivityLogService;
use crate::features::announcements::models::{Announcement, NewAnnouncement};
use crate::features::announcements::repositories::AnnouncementRepository;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::models::{
    Document, DocumentCategory, DocumentSource, DocumentType, NewDocument,
};
use crate::features::documents::repositories::{DocumentFilter, DocumentRepository};
use crate::features::documents::{DocumentService, DocumentState, PreviewRenderer};
use crate::features::sync::models::{SyncedRecord, SyncedRecordUpsert};
use crate::features::sync::repositories::SyncedRecordRepository;
use crate::features::sync::services::{FetchedFile, FileFetcher};
use crate::features::tags::models::Tag;
use crate::features::tags::repositories::TagRepository;
use crate::features::tags::TagService;
use crate::modules::record_store::{ExternalRecord, RecordStore, RecordStoreError};
use crate::modules::storage::FileStorage;
use crate::shared::cache::TtlCache;

// =============================================================================
// USERS
// =============================================================================

fn user(sub: &str, name: &str, roles: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: sub.to_string(),
        name: Some(name.to_string()),
        email: Some(format!("{}@advisor.test", sub)),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

pub fn plain_user() -> AuthenticatedUser {
    user("user-1", "Advisor", &[])
}

pub fn staff_user() -> AuthenticatedUser {
    user("staff-1", "Staff", &["staff"])
}

pub fn admin_user() -> AuthenticatedUser {
    user("admin-1", "Admin", &["admin"])
}

/// Make every request of `router` arrive as `user`, standing in for `auth_middleware`
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Linked investment document pointing at `https://example.com/doc.pdf`
pub fn sample_new_document(title: &str) -> NewDocument {
    NewDocument {
        title: title.to_string(),
        description: String::new(),
        category: DocumentCategory::UsStock,
        source: DocumentSource::GoogleDrive,
        file: None,
        external_url: Some("https://example.com/doc.pdf".to_string()),
        uploaded_by: None,
        auto_category: None,
        preview_url: None,
    }
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    docs: RwLock<Vec<Document>>,
    tag_links: RwLock<HashMap<(DocumentType, i64), Vec<i64>>>,
    next_id: AtomicI64,
}

impl InMemoryDocumentRepository {
    pub async fn count(&self) -> usize {
        self.docs.read().await.len()
    }
}

fn matches_query(doc: &Document, query: &str) -> bool {
    let query = query.to_lowercase();
    doc.title.to_lowercase().contains(&query) || doc.description.to_lowercase().contains(&query)
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, kind: DocumentType, doc: NewDocument) -> Result<Document> {
        let now = Utc::now();
        let (file_key, file_name, content_type) = match doc.file {
            Some(f) => (Some(f.key), Some(f.name), Some(f.content_type)),
            None => (None, None, None),
        };
        let stored = Document {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            document_type: kind,
            title: doc.title,
            description: doc.description,
            file_key,
            file_name,
            content_type,
            external_url: doc.external_url,
            source: doc.source,
            category: doc.category,
            uploaded_by: doc.uploaded_by,
            download_count: 0,
            is_active: true,
            auto_category: doc.auto_category,
            preview_url: doc.preview_url,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.docs.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, doc: &Document) -> Result<Document> {
        let mut docs = self.docs.write().await;
        let existing = docs
            .iter_mut()
            .find(|d| d.document_type == doc.document_type && d.id == doc.id)
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", doc.id)))?;
        existing.title = doc.title.clone();
        existing.description = doc.description.clone();
        existing.external_url = doc.external_url.clone();
        existing.source = doc.source;
        existing.category = doc.category;
        existing.is_active = doc.is_active;
        existing.auto_category = doc.auto_category.clone();
        existing.preview_url = doc.preview_url.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn find_by_id(&self, kind: DocumentType, id: i64) -> Result<Option<Document>> {
        Ok(self
            .docs
            .read()
            .await
            .iter()
            .find(|d| d.document_type == kind && d.id == id)
            .cloned())
    }

    async fn list(&self, kind: DocumentType, filter: &DocumentFilter) -> Result<(Vec<Document>, i64)> {
        let docs = self.docs.read().await;
        let mut matching: Vec<Document> = docs
            .iter()
            .filter(|d| d.document_type == kind && d.is_active)
            .filter(|d| filter.category.is_none_or(|c| d.category == c))
            .filter(|d| filter.query.as_deref().is_none_or(|q| matches_query(d, q)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn increment_download_count(&self, kind: DocumentType, id: i64) -> Result<i64> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .iter_mut()
            .find(|d| d.document_type == kind && d.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))?;
        doc.download_count += 1;
        Ok(doc.download_count)
    }

    async fn replace_tags(&self, kind: DocumentType, id: i64, tag_ids: &[i64]) -> Result<()> {
        self.tag_links
            .write()
            .await
            .insert((kind, id), tag_ids.to_vec());
        Ok(())
    }
}

/// Object store keeping files in a map; URLs use the `memory://` scheme
#[derive(Default)]
pub struct InMemoryFileStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryFileStorage {
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Simulate objects vanishing from the bucket
    pub async fn clear(&self) {
        self.objects.write().await.clear();
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    fn object_key(&self, path: &str) -> String {
        format!("documents/{}", path)
    }

    async fn upload(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<String> {
        self.objects.write().await.insert(key.to_string(), data);
        Ok(key.to_string())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::DownloadFailed(format!("Object {} not found", key)))
    }

    fn file_url(&self, key: &str) -> String {
        format!("memory://{}", key)
    }
}

pub fn document_service(
    repo: Arc<InMemoryDocumentRepository>,
    storage: Arc<InMemoryFileStorage>,
    tags: Arc<InMemoryTagRepository>,
) -> DocumentService {
    DocumentService::new(
        repo,
        Arc::new(TagService::new(tags)),
        storage,
        Arc::new(TtlCache::new()),
        PreviewRenderer::new(PreviewConfig::default().viewer_template)
            .expect("default viewer template is valid"),
        Duration::from_secs(60),
    )
}

/// Document and activity services wired over in-memory fakes
pub struct TestDocuments {
    pub repo: Arc<InMemoryDocumentRepository>,
    pub storage: Arc<InMemoryFileStorage>,
    pub logs: Arc<InMemoryActivityLogRepository>,
    pub cache: Arc<TtlCache>,
    pub service: Arc<DocumentService>,
    pub activity: Arc<ActivityLogService>,
}

impl TestDocuments {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryDocumentRepository::default());
        let storage = Arc::new(InMemoryFileStorage::default());
        let logs = Arc::new(InMemoryActivityLogRepository::default());
        let cache = Arc::new(TtlCache::new());
        let service = Arc::new(DocumentService::new(
            repo.clone(),
            Arc::new(TagService::new(Arc::new(InMemoryTagRepository::default()))),
            storage.clone(),
            cache.clone(),
            PreviewRenderer::new(PreviewConfig::default().viewer_template)
                .expect("default viewer template is valid"),
            Duration::from_secs(60),
        ));
        let activity = Arc::new(ActivityLogService::new(logs.clone(), repo.clone()));
        Self {
            repo,
            storage,
            logs,
            cache,
            service,
            activity,
        }
    }

    pub fn state(&self) -> DocumentState {
        DocumentState {
            documents: self.service.clone(),
            activity: self.activity.clone(),
        }
    }
}

// =============================================================================
// TAGS
// =============================================================================

#[derive(Default)]
pub struct InMemoryTagRepository {
    tags: RwLock<Vec<Tag>>,
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn list(&self) -> Result<Vec<Tag>> {
        let mut tags = self.tags.read().await.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self.tags.read().await.iter().find(|t| t.name == name).cloned())
    }

    async fn create(&self, name: &str, slug: &str) -> Result<Tag> {
        let mut tags = self.tags.write().await;
        if tags.iter().any(|t| t.name == name || t.slug == slug) {
            return Err(AppError::Conflict(format!(
                "Tag '{}' or slug '{}' already exists",
                name, slug
            )));
        }
        let tag = Tag {
            id: tags.len() as i64 + 1,
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: Utc::now(),
        };
        tags.push(tag.clone());
        Ok(tag)
    }
}

// =============================================================================
// ACTIVITY LOGS
// =============================================================================

#[derive(Default)]
pub struct InMemoryActivityLogRepository {
    logs: RwLock<Vec<ActivityLog>>,
}

impl InMemoryActivityLogRepository {
    /// Every row in write order
    pub async fn entries(&self) -> Vec<ActivityLog> {
        self.logs.read().await.clone()
    }

    /// Move a row's timestamp, for period boundaries
    pub async fn backdate(&self, id: i64, created_at: DateTime<Utc>) {
        if let Some(log) = self.logs.write().await.iter_mut().find(|l| l.id == id) {
            log.created_at = created_at;
        }
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryActivityLogRepository {
    async fn append(&self, entry: NewActivityLog) -> Result<ActivityLog> {
        let mut logs = self.logs.write().await;
        let log = ActivityLog {
            id: logs.len() as i64 + 1,
            user_id: entry.user_id,
            action: entry.action,
            document_type: entry.document_type,
            document_id: entry.document_id,
            document_title: entry.document_title,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            details: entry.details.map(Json),
            created_at: Utc::now(),
        };
        logs.push(log.clone());
        Ok(log)
    }

    async fn list(&self, filter: &ActivityLogFilter) -> Result<(Vec<ActivityLog>, i64)> {
        let logs = self.logs.read().await;
        let mut matching: Vec<ActivityLog> = logs
            .iter()
            .filter(|l| filter.user_id.as_deref().is_none_or(|u| l.user_id == u))
            .filter(|l| filter.action.is_none_or(|a| l.action == a))
            .filter(|l| filter.document_type.is_none_or(|t| l.document_type == t))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn stats(&self, window: &StatsWindow) -> Result<ActivityStats> {
        let (recent, _) = self
            .list(&ActivityLogFilter {
                limit: window.recent_limit,
                ..Default::default()
            })
            .await?;

        let logs = self.logs.read().await;
        let mut top_documents: Vec<DocumentActivityCount> = Vec::new();
        for log in logs.iter() {
            let Some(document_id) = log.document_id else {
                continue;
            };
            if !matches!(log.action, ActivityAction::View | ActivityAction::Download) {
                continue;
            }
            let idx = match top_documents
                .iter()
                .position(|c| c.document_type == log.document_type && c.document_id == document_id)
            {
                Some(idx) => idx,
                None => {
                    top_documents.push(DocumentActivityCount {
                        document_type: log.document_type,
                        document_id,
                        document_title: None,
                        views: 0,
                        downloads: 0,
                    });
                    top_documents.len() - 1
                }
            };
            let count = &mut top_documents[idx];
            if log.action == ActivityAction::View {
                count.views += 1;
            } else {
                count.downloads += 1;
            }
            if log.document_title.is_some() {
                count.document_title = log.document_title.clone();
            }
        }
        top_documents.sort_by(|a, b| {
            (b.views, b.downloads, b.document_id).cmp(&(a.views, a.downloads, a.document_id))
        });
        top_documents.truncate(window.top_limit.max(0) as usize);

        let mut weekly_users: Vec<&str> = logs
            .iter()
            .filter(|l| l.created_at >= window.week_start)
            .map(|l| l.user_id.as_str())
            .collect();
        weekly_users.sort_unstable();
        weekly_users.dedup();

        let monthly_downloads = logs
            .iter()
            .filter(|l| l.action == ActivityAction::Download && l.created_at >= window.month_start)
            .count() as i64;

        Ok(ActivityStats {
            recent,
            top_documents,
            weekly_active_users: weekly_users.len() as i64,
            monthly_downloads,
        })
    }
}

// =============================================================================
// ANNOUNCEMENTS
// =============================================================================

#[derive(Default)]
pub struct InMemoryAnnouncementRepository {
    items: RwLock<Vec<Announcement>>,
}

/// Important first, then newest (ids grow with insertion)
fn by_importance_then_newest(items: &mut [Announcement]) {
    items.sort_by(|a, b| {
        b.is_important
            .cmp(&a.is_important)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl AnnouncementRepository for InMemoryAnnouncementRepository {
    async fn list_active(&self, limit: i64, offset: i64) -> Result<(Vec<Announcement>, i64)> {
        let mut active: Vec<Announcement> = self
            .items
            .read()
            .await
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect();
        by_importance_then_newest(&mut active);

        let total = active.len() as i64;
        let page = active
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_current(&self, now: DateTime<Utc>) -> Result<Vec<Announcement>> {
        let mut current: Vec<Announcement> = self
            .items
            .read()
            .await
            .iter()
            .filter(|a| a.is_current_at(now))
            .cloned()
            .collect();
        by_importance_then_newest(&mut current);
        Ok(current)
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Announcement>> {
        let mut active: Vec<Announcement> = self
            .items
            .read()
            .await
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.id.cmp(&a.id));
        active.truncate(limit.max(0) as usize);
        Ok(active)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>> {
        Ok(self.items.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn insert(&self, a: NewAnnouncement) -> Result<Announcement> {
        let mut items = self.items.write().await;
        let now = Utc::now();
        let announcement = Announcement {
            id: items.len() as i64 + 1,
            title: a.title,
            content: a.content,
            author_id: a.author_id,
            start_date: a.start_date,
            end_date: a.end_date,
            is_active: a.is_active,
            is_important: a.is_important,
            created_at: now,
            updated_at: now,
        };
        items.push(announcement.clone());
        Ok(announcement)
    }

    async fn update(&self, a: &Announcement) -> Result<Announcement> {
        let mut items = self.items.write().await;
        let existing = items
            .iter_mut()
            .find(|x| x.id == a.id)
            .ok_or_else(|| AppError::NotFound(format!("Announcement {} not found", a.id)))?;
        *existing = Announcement {
            updated_at: Utc::now(),
            ..a.clone()
        };
        Ok(existing.clone())
    }
}

// =============================================================================
// RECORD-STORE SYNC
// =============================================================================

pub struct InMemoryRecordStore {
    records: RwLock<Vec<ExternalRecord>>,
}

impl InMemoryRecordStore {
    pub fn new(records: Vec<ExternalRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Swap the upstream contents between sync runs
    pub async fn replace(&self, records: Vec<ExternalRecord>) {
        *self.records.write().await = records;
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_records(&self) -> std::result::Result<Vec<ExternalRecord>, RecordStoreError> {
        Ok(self.records.read().await.clone())
    }
}

#[derive(Default)]
pub struct InMemorySyncedRecordRepository {
    rows: RwLock<Vec<SyncedRecord>>,
}

impl InMemorySyncedRecordRepository {
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl SyncedRecordRepository for InMemorySyncedRecordRepository {
    async fn upsert(&self, record: &SyncedRecordUpsert) -> Result<SyncedRecord> {
        let mut rows = self.rows.write().await;
        let now = Utc::now();
        let id = rows
            .iter()
            .find(|r| r.record_id == record.record_id)
            .map(|r| r.id)
            .unwrap_or(rows.len() as i64 + 1);
        let row = SyncedRecord {
            id,
            record_id: record.record_id.clone(),
            title: record.title.clone(),
            category: record.category.clone(),
            file_url: record.file_url.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            synced_at: now,
        };
        match rows.iter_mut().find(|r| r.record_id == record.record_id) {
            Some(existing) => *existing = row.clone(),
            None => rows.push(row.clone()),
        }
        Ok(row)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<SyncedRecord>, i64)> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_by_record_id(&self, record_id: &str) -> Result<Option<SyncedRecord>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|r| r.record_id == record_id)
            .cloned())
    }
}

/// Serves one fixed body for every URL, or fails every fetch
pub struct StaticFileFetcher {
    body: Option<(Vec<u8>, String)>,
}

impl StaticFileFetcher {
    pub fn serving(data: &[u8], content_type: &str) -> Self {
        Self {
            body: Some((data.to_vec(), content_type.to_string())),
        }
    }

    pub fn failing() -> Self {
        Self { body: None }
    }
}

#[async_trait]
impl FileFetcher for StaticFileFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedFile> {
        match &self.body {
            Some((data, content_type)) => Ok(FetchedFile {
                data: data.clone(),
                content_type: Some(content_type.clone()),
            }),
            None => Err(AppError::DownloadFailed(format!("upstream refused {}", url))),
        }
    }
}
