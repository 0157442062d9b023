use async_trait::async_trait;
use reqwest::{header, Client};

use crate::core::error::AppError;
use crate::features::documents::dtos::MAX_FILE_SIZE;

#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// Fetches remote files for the download proxy
#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Any transport error or non-2xx status is `DownloadFailed`
    async fn fetch(&self, url: &str) -> Result<FetchedFile, AppError>;
}

pub struct HttpFileFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpFileFetcher {
    pub fn new() -> Self {
        Self::with_limit(MAX_FILE_SIZE)
    }

    /// Bodies larger than `max_bytes` are refused
    pub fn with_limit(max_bytes: usize) -> Self {
        Self {
            client: Client::new(),
            max_bytes,
        }
    }
}

impl Default for HttpFileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn too_large(url: &str, max_bytes: usize) -> AppError {
    tracing::warn!("Upstream file {} exceeds {} bytes", url, max_bytes);
    AppError::DownloadFailed(format!("Upstream file exceeds {} bytes", max_bytes))
}

/// Append a body chunk, failing once the running total passes `max_bytes`
fn append_chunk(buf: &mut Vec<u8>, chunk: &[u8], max_bytes: usize) -> Result<(), usize> {
    if buf.len() + chunk.len() > max_bytes {
        return Err(buf.len() + chunk.len());
    }
    buf.extend_from_slice(chunk);
    Ok(())
}

#[async_trait]
impl FileFetcher for HttpFileFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedFile, AppError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!("Upstream fetch of {} failed: {}", url, e);
                AppError::DownloadFailed(e.to_string())
            })?;

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(too_large(url, self.max_bytes));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Content-Length may be absent (chunked), so the limit is also enforced while reading
        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            tracing::error!("Reading upstream body of {} failed: {}", url, e);
            AppError::DownloadFailed(e.to_string())
        })? {
            append_chunk(&mut data, &chunk, self.max_bytes)
                .map_err(|_| too_large(url, self.max_bytes))?;
        }

        Ok(FetchedFile { data, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};

    async fn serve_bytes(size: usize) -> String {
        let app = Router::new().route("/file.pdf", get(move || async move { vec![b'a'; size] }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/file.pdf", addr)
    }

    #[test]
    fn test_append_chunk_stops_at_limit() {
        let mut buf = Vec::new();
        assert!(append_chunk(&mut buf, &[1; 6], 10).is_ok());
        assert_eq!(append_chunk(&mut buf, &[1; 5], 10), Err(11));
        assert_eq!(buf.len(), 6);
        assert!(append_chunk(&mut buf, &[1; 4], 10).is_ok());
        assert_eq!(buf.len(), 10);
    }

    #[tokio::test]
    async fn test_fetch_refuses_bodies_over_the_limit() {
        let url = serve_bytes(2048).await;

        let result = HttpFileFetcher::with_limit(1024).fetch(&url).await;
        assert!(matches!(result, Err(AppError::DownloadFailed(_))));

        let fetched = HttpFileFetcher::with_limit(4096).fetch(&url).await.unwrap();
        assert_eq!(fetched.data.len(), 2048);
    }
}
