mod tag_dto;

pub use tag_dto::{CreateTagDto, TagResponseDto};
