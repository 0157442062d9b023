mod home_dto;

pub use home_dto::HomeOverviewDto;
