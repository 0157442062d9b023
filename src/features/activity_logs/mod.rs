//! Append-only audit trail of document activity.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgActivityLogRepository;
pub use services::{Activity, ActivityLogService};
