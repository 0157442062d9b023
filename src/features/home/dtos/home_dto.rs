use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::announcements::dtos::AnnouncementResponseDto;
use crate::features::documents::dtos::DocumentResponseDto;

/// Landing page: newest announcements and documents
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeOverviewDto {
    pub announcements: Vec<AnnouncementResponseDto>,
    pub insurance_documents: Vec<DocumentResponseDto>,
    pub investment_documents: Vec<DocumentResponseDto>,
}
