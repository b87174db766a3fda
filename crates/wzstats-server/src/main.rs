//! wzstats server - HTTP API over the cached stats client.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wzstats_core::config::NetworkConfig;
use wzstats_core::{CacheConfig, CachingClient, UpstreamClient, UpstreamConfig};
use wzstats_server::{
    build_router, serve, shutdown_signal, AppState, RateLimitState, RouterOptions,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "wzstats-server")]
#[command(about = "HTTP API serving cached Call of Duty player stats")]
struct Args {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Base URL of the upstream stats API
    #[arg(long, env = "COD_API_BASE_URL", default_value = NetworkConfig::DEFAULT_BASE_URL)]
    cod_api_base_url: String,

    /// Initial upstream session token
    #[arg(long, env = "COD_SSO_TOKEN", default_value = "", hide_env_values = true)]
    cod_sso_token: String,

    /// Bearer key for the admin routes (unset disables them)
    #[arg(long, env = "ADMIN_API_KEY", hide_env_values = true)]
    admin_api_key: Option<String>,

    /// Comma-separated CORS origins
    #[arg(
        long,
        env = "CORS_ALLOWED_ORIGINS",
        default_value = "http://localhost:5173",
        value_delimiter = ','
    )]
    cors_allowed_origins: Vec<String>,

    /// Log filter, e.g. `info` or `wzstats_core=debug,info`
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Freshness window for stats, in seconds
    #[arg(long, env = "STATS_CACHE_TTL_SECS", default_value_t = 300)]
    stats_cache_ttl_secs: u64,

    /// Freshness window for match lists, in seconds
    #[arg(long, env = "MATCH_CACHE_TTL_SECS", default_value_t = 120)]
    match_cache_ttl_secs: u64,

    /// Requests per minute allowed from one client IP
    #[arg(long, env = "RATE_LIMIT_PER_MINUTE", default_value_t = 100)]
    rate_limit_per_minute: u32,
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.compact().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_format);

    info!("Starting wzstats server");

    if args.cod_sso_token.is_empty() {
        warn!("COD_SSO_TOKEN is not set; upstream requests will fail until a token is supplied");
    }

    let admin_api_key = args.admin_api_key.filter(|key| !key.is_empty());
    if admin_api_key.is_none() {
        warn!("ADMIN_API_KEY is not set; admin routes are disabled");
    }

    let upstream = UpstreamClient::new(UpstreamConfig::new(
        args.cod_api_base_url.as_str(),
        args.cod_sso_token.as_str(),
    ))
    .context("failed to build upstream client")?;

    let cache_config = CacheConfig::default()
        .with_stats_ttl(Duration::from_secs(args.stats_cache_ttl_secs))
        .with_match_ttl(Duration::from_secs(args.match_cache_ttl_secs));
    let stats = Arc::new(CachingClient::new(Arc::new(upstream), cache_config));

    let rate_limit = RateLimitState::per_minute(args.rate_limit_per_minute);
    let pruning = rate_limit.spawn_pruning(Duration::from_secs(60));

    let state = Arc::new(AppState {
        stats: stats.clone(),
        admin_api_key,
    });
    let options = RouterOptions {
        allowed_origins: args.cors_allowed_origins,
        rate_limit,
    };
    let app = build_router(state, &options);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    serve(listener, app, shutdown_signal()).await?;

    stats.shutdown();
    pruning.abort();
    info!("Server stopped");

    Ok(())
}
