mod announcement_service;

pub use announcement_service::AnnouncementService;
