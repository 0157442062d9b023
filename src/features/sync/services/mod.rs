mod file_fetcher;
mod sync_service;

pub use file_fetcher::{FetchedFile, FileFetcher, HttpFileFetcher};
pub use sync_service::{SyncService, SyncedDownload};
