//! # starpress: publishing gateway for the Star content service
//!
//! `starpress` sits between a browser-based authoring front end and the Star content
//! service. The content service holds the data; this crate holds the credentials and the
//! transfer logic the front end cannot be trusted with.
//!
//! ## Overview
//!
//! Two independent flows make up the crate.
//!
//! ### Write-proxy flow
//!
//! The editor front end submits finished posts to `POST /api/posts` on this gateway.
//! The handler validates the payload (title and content must be present and non-empty),
//! attaches the server-held API key as an `X-API-Key` header, and forwards the request to
//! the content service's write endpoint. Success bodies come back to the caller verbatim;
//! backend rejections keep their original status code and are normalized into a JSON
//! `{"error": ...}` shape. The handler is stateless - concurrent requests share only the
//! HTTP connection pool and immutable configuration, and a failed request leaves nothing
//! behind to clean up.
//!
//! ### Upload flow
//!
//! The [`upload::UploadClient`] is a library surface for the editor's image handling. It
//! validates a selected file locally (size cap, image-type allow-list), requires a login
//! credential from the injected [`session::SessionStore`], then streams the file as a
//! multipart body to the content service's upload endpoint. Callers can observe
//! byte-level progress through a callback and abort the transfer through a
//! cancellation token; the call resolves exactly once, with the stored resource's URL on
//! success. See the [`upload`] module docs for the full contract.
//!
//! ## Configuration
//!
//! Configuration is YAML plus `STARPRESS_`-prefixed environment overrides, loaded through
//! [`Config::load`] (see [`config`]). The backend base address defaults to the production
//! content service; the write credential is usually supplied via the bare `API_KEY`
//! environment variable and is never serialized into request bodies or logs at the
//! boundary.
//!
//! ## Ambient surface
//!
//! Beyond the proxy route the server exposes `GET /healthz` for liveness checks and
//! interactive API documentation at `/docs`. Request/response tracing and CORS are
//! applied as router layers.

pub mod api;
pub mod config;
pub mod errors;
pub mod openapi;
pub mod session;
pub mod telemetry;
pub mod upload;

#[cfg(test)]
mod test;

use axum::http::HeaderValue;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use config::CorsOrigin;
use openapi::ApiDoc;

/// Application state shared across all request handlers.
///
/// Holds the loaded configuration and the shared outbound HTTP client. Both are cheap to
/// clone and immutable for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
}

/// Make sure a rustls crypto provider is installed before a TLS-capable client is built.
///
/// reqwest is compiled with `rustls-no-provider`, which leaves provider selection to the
/// process. The binary installs one at startup, but library embedders (and the test
/// harness) may not have, so client constructors call this instead of relying on ambient
/// process state.
pub(crate) fn ensure_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = &config.cors;

    // A wildcard anywhere in the list means "any origin"; tower-http rejects a
    // literal `*` inside an origin list
    let allow_origin = if cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(cors.allow_credentials)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION]);

    if let Some(max_age) = cors.max_age {
        layer = layer.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(layer)
}

/// Build the application router with all endpoints and middleware.
///
/// Routes:
/// - `GET /healthz` - liveness probe
/// - `POST /api/posts` - the write proxy
/// - `GET /docs` - interactive OpenAPI documentation
///
/// CORS and HTTP tracing are applied as outer layers.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api/posts", post(api::handlers::posts::create_post))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns the router and configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] builds the shared HTTP client and router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        ensure_crypto_provider();
        let http = reqwest::Client::builder().timeout(config.backend.timeout).build()?;

        let state = AppState {
            config: config.clone(),
            http,
        };
        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Publishing gateway listening on http://{}, forwarding to {}",
            bind_addr, self.config.backend.url
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutdown complete");

        Ok(())
    }
}
