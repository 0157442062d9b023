use std::sync::Arc;

use chrono::Utc;

use crate::core::error::{AppError, Result};
use crate::features::announcements::dtos::{
    check_window, AnnouncementResponseDto, CreateAnnouncementDto, UpdateAnnouncementDto,
};
use crate::features::announcements::models::{Announcement, NewAnnouncement};
use crate::features::announcements::repositories::AnnouncementRepository;
use crate::features::documents::services::HOME_PATH;
use crate::shared::cache::{page_cache_prefix, TtlCache};
use crate::shared::types::PaginationQuery;

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
    cache: Arc<TtlCache>,
}

impl AnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementRepository>, cache: Arc<TtlCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn list(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<AnnouncementResponseDto>, i64)> {
        let (items, total) = self
            .repo
            .list_active(pagination.limit(), pagination.offset())
            .await?;
        Ok((items.into_iter().map(Into::into).collect(), total))
    }

    pub async fn current(&self) -> Result<Vec<AnnouncementResponseDto>> {
        let items = self.repo.list_current(Utc::now()).await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    pub async fn latest(&self, limit: i64) -> Result<Vec<AnnouncementResponseDto>> {
        let items = self.repo.latest(limit).await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    /// Inactive announcements are hidden from readers
    pub async fn get(&self, id: i64) -> Result<AnnouncementResponseDto> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|a| a.is_active)
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Announcement {} not found", id)))
    }

    pub async fn create(
        &self,
        dto: CreateAnnouncementDto,
        author_id: &str,
    ) -> Result<AnnouncementResponseDto> {
        let announcement = self
            .repo
            .insert(NewAnnouncement {
                title: dto.title.trim().to_string(),
                content: dto.content,
                author_id: Some(author_id.to_string()),
                start_date: dto.start_date.unwrap_or_else(Utc::now),
                end_date: dto.end_date,
                is_active: dto.is_active,
                is_important: dto.is_important,
            })
            .await?;

        self.invalidate_home().await;
        tracing::info!("Announcement {} published by {}", announcement.id, author_id);
        Ok(announcement.into())
    }

    pub async fn update(&self, id: i64, dto: UpdateAnnouncementDto) -> Result<AnnouncementResponseDto> {
        let mut announcement: Announcement = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Announcement {} not found", id)))?;

        if let Some(title) = dto.title {
            announcement.title = title.trim().to_string();
        }
        if let Some(content) = dto.content {
            announcement.content = content;
        }
        if let Some(start_date) = dto.start_date {
            announcement.start_date = start_date;
        }
        if dto.end_date.is_some() {
            announcement.end_date = dto.end_date;
        }
        if let Some(is_important) = dto.is_important {
            announcement.is_important = is_important;
        }
        if let Some(is_active) = dto.is_active {
            announcement.is_active = is_active;
        }

        check_window(Some(announcement.start_date), announcement.end_date)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let updated = self.repo.update(&announcement).await?;
        self.invalidate_home().await;
        tracing::info!("Announcement {} updated", id);
        Ok(updated.into())
    }

    async fn invalidate_home(&self) {
        self.cache.invalidate_prefix(&page_cache_prefix(HOME_PATH)).await;
    }
}
