use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

use crate::core::error::AppError;

/// `Content-Disposition` value carrying a UTF-8 file name (RFC 6266 / 5987)
pub fn content_disposition(file_name: &str) -> String {
    let ascii_fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback,
        urlencoding::encode(file_name)
    )
}

/// Serve bytes as a file download
pub fn attachment_response(
    data: Vec<u8>,
    file_name: &str,
    content_type: &str,
) -> Result<Response, AppError> {
    let content_type = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&content_disposition(file_name))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}

/// 302 to an external location
pub fn found_redirect(location: &str) -> Result<Response, AppError> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| AppError::Internal(format!("Unusable redirect target: {}", location)))?;

    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(Body::empty())
        .map_err(|e| AppError::Internal(format!("Failed to build redirect response: {}", e)))
}
