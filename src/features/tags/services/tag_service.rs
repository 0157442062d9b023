use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::core::error::{AppError, Result};
use crate::features::tags::dtos::{CreateTagDto, TagResponseDto};
use crate::features::tags::models::Tag;
use crate::features::tags::repositories::TagRepository;
use crate::shared::validation::slugify;

/// Column width of `tags.name`
pub const MAX_TAG_NAME_CHARS: usize = 50;

pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<TagResponseDto>> {
        let tags = self.repo.list().await?;
        Ok(tags.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, dto: CreateTagDto) -> Result<TagResponseDto> {
        let name = dto.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name must not be blank".to_string()));
        }

        let slug = dto.slug.unwrap_or_else(|| slugify(name));
        let tag = self.repo.create(name, &slug).await?;

        tracing::info!("Created tag '{}' ({})", tag.name, tag.slug);
        Ok(tag.into())
    }

    /// Trim names, drop blanks and duplicates, reject names wider than the column
    pub fn normalize_names(names: &[String]) -> Result<Vec<String>> {
        let mut normalized: Vec<String> = Vec::new();

        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            if name.chars().count() > MAX_TAG_NAME_CHARS {
                return Err(AppError::Validation(format!(
                    "Tag '{}' exceeds {} characters",
                    name, MAX_TAG_NAME_CHARS
                )));
            }
            if !normalized.iter().any(|n| n == name) {
                normalized.push(name.to_string());
            }
        }

        Ok(normalized)
    }

    /// Resolve tag names to tags, creating the unknown ones
    pub async fn ensure_tags(&self, names: &[String]) -> Result<Vec<Tag>> {
        let names = Self::normalize_names(names)?;
        let mut tags: Vec<Tag> = Vec::with_capacity(names.len());

        for name in &names {
            let tag = match self.repo.find_by_name(name).await? {
                Some(tag) => tag,
                None => self.create_with_free_slug(name).await?,
            };
            tags.push(tag);
        }

        Ok(tags)
    }

    /// Different names can slugify identically ("ETF" / "etf"); disambiguate with a digest suffix
    async fn create_with_free_slug(&self, name: &str) -> Result<Tag> {
        let slug = slugify(name);
        match self.repo.create(name, &slug).await {
            Err(AppError::Conflict(_)) => {
                if let Some(existing) = self.repo.find_by_name(name).await? {
                    return Ok(existing);
                }
                let digest = hex::encode(Sha256::digest(name.as_bytes()));
                let suffixed = format!("{}-{}", slug, &digest[..6]);
                self.repo.create(name, &suffixed).await
            }
            other => other,
        }
    }
}
