use std::env;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub ingest: IngestConfig,
    pub cache: CacheConfig,
    pub preview: PreviewConfig,
    pub airtable: AirtableConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    pub slow_request_threshold: Duration,
    /// Peers whose X-Forwarded-For / X-Real-IP headers are believed
    pub trusted_proxies: Vec<IpAddr>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for uploaded documents
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Endpoint used when building URLs handed to browsers and viewers
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Key prefix under which document files are stored
    pub documents_prefix: String,
}

/// Shared secret used by the external automation tool
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub page_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Jinja template receiving `file_url` (already URL-encoded)
    pub viewer_template: String,
}

/// Airtable record store used by the synchronization routine
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub api_url: String,
    pub api_key: String,
    pub base_id: String,
    pub table_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            ingest: IngestConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            preview: PreviewConfig::from_env(),
            airtable: AirtableConfig::from_env(),
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 25 * 1024 * 1024; // 25MB
    const DEFAULT_SLOW_REQUEST_THRESHOLD_MS: u64 = 1000;

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let slow_request_threshold_ms = env::var("SLOW_REQUEST_THRESHOLD_MS")
            .unwrap_or_else(|_| Self::DEFAULT_SLOW_REQUEST_THRESHOLD_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "SLOW_REQUEST_THRESHOLD_MS must be a valid number".to_string())?;

        let trusted_proxies =
            parse_trusted_proxies(&env::var("TRUSTED_PROXIES").unwrap_or_default())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            slow_request_threshold: Duration::from_millis(slow_request_threshold_ms),
            trusted_proxies,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Comma-separated IP addresses; empty means no proxy is trusted
fn parse_trusted_proxies(raw: &str) -> Result<Vec<IpAddr>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpAddr>()
                .map_err(|_| format!("TRUSTED_PROXIES contains an invalid IP address: {}", s))
        })
        .collect()
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60; // 1 minute

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("OIDC_ISSUER")
            .map_err(|_| "OIDC_ISSUER environment variable is required".to_string())?;

        let audience = env::var("OIDC_AUDIENCE")
            .map_err(|_| "OIDC_AUDIENCE environment variable is required".to_string())?;

        let jwks_cache_ttl_secs = env::var("JWKS_CACHE_TTL")
            .unwrap_or_else(|_| Self::DEFAULT_JWKS_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWKS_CACHE_TTL must be a valid number".to_string())?;

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            issuer,
            audience,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Advisor Portal API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for the advisor intranet portal".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        // Public endpoint defaults to the main endpoint if not specified
        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "portal-documents".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let documents_prefix =
            env::var("MINIO_DOCUMENTS_PREFIX").unwrap_or_else(|_| "documents".to_string());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            documents_prefix,
        })
    }
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("INGEST_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "INGEST_API_KEY environment variable is required".to_string())?;

        Ok(Self { api_key })
    }
}

impl CacheConfig {
    const DEFAULT_PAGE_CACHE_TTL_SECS: u64 = 300; // 5 minutes

    pub fn from_env() -> Result<Self, String> {
        let page_ttl_secs = env::var("PAGE_CACHE_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_PAGE_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "PAGE_CACHE_TTL_SECS must be a valid number".to_string())?;

        Ok(Self {
            page_ttl: Duration::from_secs(page_ttl_secs),
        })
    }
}

impl PreviewConfig {
    pub const DEFAULT_VIEWER_TEMPLATE: &'static str =
        "https://docs.google.com/viewer?url={{ file_url }}&embedded=true";

    pub fn from_env() -> Self {
        let viewer_template = env::var("PREVIEW_VIEWER_TEMPLATE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_VIEWER_TEMPLATE.to_string());

        Self { viewer_template }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            viewer_template: Self::DEFAULT_VIEWER_TEMPLATE.to_string(),
        }
    }
}

impl AirtableConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("AIRTABLE_API_URL")
                .unwrap_or_else(|_| "https://api.airtable.com/v0".to_string()),
            api_key: env::var("AIRTABLE_API_KEY").unwrap_or_default(),
            base_id: env::var("AIRTABLE_BASE_ID").unwrap_or_default(),
            table_id: env::var("AIRTABLE_TABLE_ID").unwrap_or_default(),
        }
    }

    /// Sync is only wired when every credential is present
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_id.is_empty() && !self.table_id.is_empty()
    }
}
