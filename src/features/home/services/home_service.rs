use std::sync::Arc;
use std::time::Duration;

use crate::core::error::{AppError, Result};
use crate::features::announcements::AnnouncementService;
use crate::features::documents::models::DocumentType;
use crate::features::documents::DocumentService;
use crate::features::home::dtos::HomeOverviewDto;
use crate::shared::cache::TtlCache;
use crate::shared::constants::HOME_SECTION_SIZE;

pub struct HomeService {
    documents: Arc<DocumentService>,
    announcements: Arc<AnnouncementService>,
    cache: Arc<TtlCache>,
    ttl: Duration,
}

impl HomeService {
    pub fn new(
        documents: Arc<DocumentService>,
        announcements: Arc<AnnouncementService>,
        cache: Arc<TtlCache>,
        ttl: Duration,
    ) -> Self {
        Self {
            documents,
            announcements,
            cache,
            ttl,
        }
    }

    /// Cached under `cache_key`; document and announcement writes drop it
    pub async fn overview(&self, cache_key: &str) -> Result<HomeOverviewDto> {
        self.cache
            .get_or_compute(cache_key, self.ttl, || async {
                let (announcements, insurance_documents, investment_documents) = tokio::try_join!(
                    self.announcements.latest(HOME_SECTION_SIZE),
                    self.documents.latest(DocumentType::Insurance, HOME_SECTION_SIZE),
                    self.documents.latest(DocumentType::Investment, HOME_SECTION_SIZE),
                )?;
                Ok::<_, AppError>(HomeOverviewDto {
                    announcements,
                    insurance_documents,
                    investment_documents,
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::announcements::dtos::CreateAnnouncementDto;
    use crate::features::documents::repositories::DocumentRepository;
    use crate::shared::cache::page_cache_key;
    use crate::shared::test_helpers::{
        sample_new_document, staff_user, InMemoryAnnouncementRepository, TestDocuments,
    };

    fn announcement(title: &str) -> CreateAnnouncementDto {
        CreateAnnouncementDto {
            title: title.to_string(),
            content: "內容".to_string(),
            start_date: None,
            end_date: None,
            is_important: false,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_overview_caps_sections_and_refreshes_after_writes() {
        let docs = TestDocuments::new();
        let announcements = Arc::new(AnnouncementService::new(
            Arc::new(InMemoryAnnouncementRepository::default()),
            docs.cache.clone(),
        ));
        let home = HomeService::new(
            docs.service.clone(),
            announcements.clone(),
            docs.cache.clone(),
            Duration::from_secs(60),
        );
        for i in 0..7 {
            docs.repo
                .insert(DocumentType::Investment, sample_new_document(&format!("週報 {}", i)))
                .await
                .unwrap();
        }
        announcements.create(announcement("第一則"), "admin-1").await.unwrap();
        let key = page_cache_key("/api/home", None);

        let overview = home.overview(&key).await.unwrap();
        assert_eq!(overview.investment_documents.len(), 5);
        assert_eq!(overview.investment_documents[0].title, "週報 6");
        assert!(overview.insurance_documents.is_empty());
        assert_eq!(overview.announcements.len(), 1);

        // Publishing drops the cached overview
        announcements.create(announcement("第二則"), "admin-1").await.unwrap();
        let overview = home.overview(&key).await.unwrap();
        assert_eq!(overview.announcements.len(), 2);
        assert_eq!(overview.announcements[0].title, "第二則");

        // So does a document write through the service
        let newest = overview.investment_documents[0].id;
        docs.service
            .delete(DocumentType::Investment, newest, &staff_user())
            .await
            .unwrap();
        let overview = home.overview(&key).await.unwrap();
        assert_eq!(overview.investment_documents[0].title, "週報 5");
    }
}
