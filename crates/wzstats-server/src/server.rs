//! Router assembly and the serve loop.

use crate::handlers::{admin, health, matches, players, CACHE_HEADER, DATA_AGE_HEADER};
use crate::middleware::{rate_limit, require_admin, RateLimitState};
use crate::error::ApiError;
use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Span};

/// Correlation header set on every request and echoed on the response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
use wzstats_core::CachingClient;

/// Application state shared across handlers.
pub struct AppState {
    /// Cached view of the upstream stats API.
    pub stats: Arc<CachingClient>,
    /// Bearer key for `/admin`; `None` disables the admin routes.
    pub admin_api_key: Option<String>,
}

/// Cross-cutting settings for the router.
#[derive(Clone)]
pub struct RouterOptions {
    /// Origins allowed by CORS. `*` allows any.
    pub allowed_origins: Vec<String>,
    pub rate_limit: RateLimitState,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::from(cors::Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| {
                HeaderValue::from_str(origin.trim())
                    .inspect_err(|_| warn!(origin = %origin, "Ignoring invalid CORS origin"))
                    .ok()
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([
            HeaderName::from_static(CACHE_HEADER),
            HeaderName::from_static(DATA_AGE_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .max_age(Duration::from_secs(300))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = %detail, "Handler panicked");
    ApiError::internal_server_error().into_response()
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Build the `/api/v1` router.
///
/// Layers from the outside in: request id assignment, tracing, request id
/// propagation, CORS, panic recovery, rate limiting.
pub fn build_router(state: Arc<AppState>, options: &RouterOptions) -> Router {
    let admin_routes = Router::new()
        .route("/token", post(admin::update_token))
        .route("/cache/:platform/:gamertag", get(admin::cache_info))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/players/search", get(players::search_player))
        .route("/players/:platform/:gamertag/stats", get(players::player_stats))
        .route(
            "/players/:platform/:gamertag/matches",
            get(matches::recent_matches),
        )
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api/v1", api)
        .layer(from_fn_with_state(options.rate_limit.clone(), rate_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(&options.allowed_origins))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    Ok(())
}

/// Resolve on Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
