use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, ConnectInfo, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Reverse proxies allowed to report the client address; installed as a request extension
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<Vec<IpAddr>>);

impl TrustedProxies {
    pub fn new(proxies: Vec<IpAddr>) -> Self {
        Self(Arc::new(proxies))
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.contains(ip)
    }
}

/// Requester details captured for the activity log
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    fn from_parts(parts: &Parts) -> Self {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        // Forwarding headers count only when the socket peer is a trusted proxy
        let behind_proxy = match (peer, parts.extensions.get::<TrustedProxies>()) {
            (Some(peer), Some(trusted)) => trusted.contains(&peer),
            _ => false,
        };

        let forwarded = behind_proxy
            .then(|| {
                let forwarded_for = parts
                    .headers
                    .get("x-forwarded-for")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(',').next())
                    .map(str::trim)
                    .filter(|v| !v.is_empty());
                let real_ip = parts
                    .headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .map(str::trim)
                    .filter(|v| !v.is_empty());
                forwarded_for.or(real_ip).map(str::to_string)
            })
            .flatten();

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        Self {
            ip_address: forwarded.or_else(|| peer.map(|ip| ip.to_string())),
            user_agent,
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = HttpRequest::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    fn from_peer(mut parts: Parts, peer: [u8; 4], trusted: &[[u8; 4]]) -> RequestContext {
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from((peer, 5000))));
        parts.extensions.insert(TrustedProxies::new(
            trusted.iter().map(|ip| IpAddr::from(*ip)).collect(),
        ));
        RequestContext::from_parts(&parts)
    }

    #[test]
    fn test_request_context_uses_forwarded_for_behind_trusted_proxy() {
        let parts = parts_with(&[
            ("x-forwarded-for", "10.0.0.7, 172.16.0.1"),
            ("x-real-ip", "192.168.1.1"),
            ("user-agent", "Mozilla/5.0"),
        ]);

        let ctx = from_peer(parts, [172, 16, 0, 1], &[[172, 16, 0, 1]]);
        assert_eq!(ctx.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(ctx.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_request_context_ignores_forwarded_headers_from_untrusted_peer() {
        let parts = parts_with(&[("x-forwarded-for", "1.2.3.4"), ("x-real-ip", "5.6.7.8")]);

        let ctx = from_peer(parts, [203, 0, 113, 9], &[[172, 16, 0, 1]]);
        assert_eq!(ctx.ip_address.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_request_context_without_trusted_list_keeps_peer() {
        let mut parts = parts_with(&[("x-forwarded-for", "1.2.3.4")]);
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 5000))));

        let ctx = RequestContext::from_parts(&parts);
        assert_eq!(ctx.ip_address.as_deref(), Some("127.0.0.1"));
        assert!(ctx.user_agent.is_none());
    }
}
