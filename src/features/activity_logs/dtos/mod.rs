mod activity_log_dto;

pub use activity_log_dto::{
    ActivityLogQuery, ActivityLogResponseDto, ActivityStatsDto, DocumentActivityDto,
};
