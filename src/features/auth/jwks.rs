use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(rename = "use", default)]
    key_use: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

impl Jwk {
    /// Only RSA signing keys can verify RS256 access tokens
    fn rsa_signing_key(&self) -> Option<(&str, &str)> {
        if self.kty != "RSA" || self.key_use.as_deref().is_some_and(|u| u != "sig") {
            return None;
        }
        Some((self.n.as_deref()?, self.e.as_deref()?))
    }
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Fetches and caches the identity provider's signing keys.
///
/// An unknown `kid` forces a refetch so key rotation is picked up without
/// waiting for the TTL.
pub struct JwksClient {
    jwks_url: String,
    client: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
    cache_ttl: Duration,
}

impl JwksClient {
    pub fn new(issuer_url: &str, cache_ttl: Duration) -> Self {
        Self {
            jwks_url: format!("{}/jwks", issuer_url.trim_end_matches('/')),
            client: reqwest::Client::new(),
            cache: RwLock::new(None),
            cache_ttl,
        }
    }

    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys.get(kid).cloned();

        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, JwksError> {
        debug!("Fetching signing keys from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::FetchError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| JwksError::ParseError(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            if let Some((n, e)) = jwk.rsa_signing_key() {
                let key = DecodingKey::from_rsa_components(n, e)
                    .map_err(|err| JwksError::KeyConversionError(err.to_string()))?;
                keys.insert(jwk.kid.clone(), key);
            }
        }

        Ok(keys)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    FetchError(String),

    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to convert key: {0}")]
    KeyConversionError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwk(json: serde_json::Value) -> Jwk {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_only_rsa_signing_keys_are_usable() {
        let sig = jwk(serde_json::json!({"kid": "a", "kty": "RSA", "use": "sig", "n": "AQAB", "e": "AQAB"}));
        assert!(sig.rsa_signing_key().is_some());

        let unspecified = jwk(serde_json::json!({"kid": "b", "kty": "RSA", "n": "AQAB", "e": "AQAB"}));
        assert!(unspecified.rsa_signing_key().is_some());

        let enc = jwk(serde_json::json!({"kid": "c", "kty": "RSA", "use": "enc", "n": "AQAB", "e": "AQAB"}));
        assert!(enc.rsa_signing_key().is_none());

        let ec = jwk(serde_json::json!({"kid": "d", "kty": "EC", "crv": "P-256"}));
        assert!(ec.rsa_signing_key().is_none());
    }
}
