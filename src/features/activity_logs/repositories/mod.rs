mod activity_log_repository;

pub use activity_log_repository::{
    ActivityLogFilter, ActivityLogRepository, PgActivityLogRepository, StatsWindow,
};
