mod synced_record_repository;

pub use synced_record_repository::{PgSyncedRecordRepository, SyncedRecordRepository};
