//! Mirror of the external record store, refreshed by an upsert pass.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgSyncedRecordRepository;
pub use services::{HttpFileFetcher, SyncService};
