//! API-key authenticated entry points for the external automation tool.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::IngestService;
