pub mod activity_logs;
pub mod announcements;
pub mod auth;
pub mod content;
pub mod documents;
pub mod home;
pub mod ingest;
pub mod sync;
pub mod tags;
