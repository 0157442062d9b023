mod announcement_repository;

pub use announcement_repository::{AnnouncementRepository, PgAnnouncementRepository};
