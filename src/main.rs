mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::extractor::TrustedProxies;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::activity_logs::{
    routes as activity_logs_routes, ActivityLogService, PgActivityLogRepository,
};
use crate::features::announcements::{
    routes as announcements_routes, AnnouncementService, PgAnnouncementRepository,
};
use crate::features::auth;
use crate::features::content::routes as content_routes;
use crate::features::documents::{
    routes as documents_routes, DocumentService, DocumentState, PgDocumentRepository,
    PreviewRenderer,
};
use crate::features::home::{routes as home_routes, HomeService};
use crate::features::ingest::{routes as ingest_routes, IngestService};
use crate::features::sync::{
    routes as sync_routes, HttpFileFetcher, PgSyncedRecordRepository, SyncService,
};
use crate::features::tags::{routes as tags_routes, PgTagRepository, TagService};
use crate::modules::record_store::{AirtableClient, RecordStore};
use crate::modules::storage::{FileStorage, MinIOClient};
use crate::shared::cache::TtlCache;
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.issuer,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized");

    // Object storage for uploaded documents (bucket is created on first start)
    let storage: Arc<dyn FileStorage> = Arc::new(
        MinIOClient::new(config.minio.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?,
    );
    tracing::info!("MinIO client initialized for bucket: {}", config.minio.bucket);

    let page_cache = Arc::new(TtlCache::new());
    let page_ttl = config.cache.page_ttl;

    // Documents and their collaborators
    let document_repo = Arc::new(PgDocumentRepository::new(pool.clone()));
    let tag_service = Arc::new(TagService::new(Arc::new(PgTagRepository::new(pool.clone()))));
    let document_service = Arc::new(DocumentService::new(
        document_repo.clone(),
        Arc::clone(&tag_service),
        Arc::clone(&storage),
        Arc::clone(&page_cache),
        PreviewRenderer::new(config.preview.viewer_template.clone())?,
        page_ttl,
    ));
    let activity_service = Arc::new(ActivityLogService::new(
        Arc::new(PgActivityLogRepository::new(pool.clone())),
        document_repo,
    ));
    tracing::info!("Document services initialized");

    let announcement_service = Arc::new(AnnouncementService::new(
        Arc::new(PgAnnouncementRepository::new(pool.clone())),
        Arc::clone(&page_cache),
    ));
    tracing::info!("Announcement service initialized");

    // Record store sync runs only when Airtable credentials are present
    let record_store: Option<Arc<dyn RecordStore>> = if config.airtable.is_configured() {
        tracing::info!("Airtable sync enabled for table: {}", config.airtable.table_id);
        Some(Arc::new(AirtableClient::new(&config.airtable)))
    } else {
        tracing::warn!("Airtable sync disabled (AIRTABLE_* not configured)");
        None
    };
    let sync_service = Arc::new(SyncService::new(
        record_store,
        Arc::new(PgSyncedRecordRepository::new(pool.clone())),
        Arc::new(HttpFileFetcher::new()),
    ));

    let ingest_service = Arc::new(IngestService::new(
        Arc::clone(&document_service),
        Arc::clone(&sync_service),
        &config.ingest.api_key,
    ));

    let home_service = Arc::new(HomeService::new(
        Arc::clone(&document_service),
        Arc::clone(&announcement_service),
        Arc::clone(&page_cache),
        page_ttl,
    ));
    tracing::info!("Portal services initialized (page cache ttl {:?})", page_ttl);

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(documents_routes::routes(DocumentState {
            documents: Arc::clone(&document_service),
            activity: Arc::clone(&activity_service),
        }))
        .merge(tags_routes::routes(tag_service))
        .merge(activity_logs_routes::routes(activity_service))
        .merge(announcements_routes::admin_routes(Arc::clone(
            &announcement_service,
        )))
        .merge(sync_routes::routes(Arc::clone(&sync_service)))
        .merge(content_routes::routes())
        .merge(home_routes::routes(home_service))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes: announcements are readable by anyone, ingestion uses its own API key
    let public_routes = Router::new()
        .merge(announcements_routes::public_routes(announcement_service))
        .merge(ingest_routes::routes(ingest_service));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(Extension(TrustedProxies::new(
            config.app.trusted_proxies.clone(),
        )))
        .layer(axum::middleware::from_fn_with_state(
            config.app.slow_request_threshold,
            middleware::timing_middleware,
        ))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    // Client addresses feed the activity log
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
