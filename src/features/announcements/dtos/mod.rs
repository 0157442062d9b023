mod announcement_dto;

pub(crate) use announcement_dto::check_window;
pub use announcement_dto::{
    AnnouncementResponseDto, CreateAnnouncementDto, UpdateAnnouncementDto,
};
