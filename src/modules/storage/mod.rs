//! Storage module for uploaded document files
//!
//! Documents uploaded through the portal are kept in MinIO/S3; the rest of the
//! crate only sees the [`FileStorage`] trait.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Full object key for a path relative to the documents prefix
    fn object_key(&self, path: &str) -> String;

    /// Store `data` under `key`, returning the key
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String, AppError>;

    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError>;

    /// Absolute URL a browser (or the preview viewer) can fetch the object from
    fn file_url(&self, key: &str) -> String;
}
