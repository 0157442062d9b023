mod synced_record;

pub use synced_record::{SyncedRecord, SyncedRecordUpsert};
