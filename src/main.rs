use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sharegate::store::postgres::PgStore;
use sharegate::store::ShareStore;
use sharegate::tools::ToolKey;
use sharegate::{cli, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional OpenTelemetry (OTLP) export, enabled only when an endpoint
    // is configured, otherwise logs go to stdout alone.
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "sharegate"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .expect("failed to install OpenTelemetry tracer");
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sharegate=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry_layer)
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Token { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            handle_token_command(&db, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let dashboard_origin = cfg.dashboard_origin.clone();
    let state = Arc::new(AppState {
        store: Arc::new(db),
        config: cfg,
    });

    let app = sharegate::router(state)
        // Management bodies are tiny; anything bigger is not a share request.
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer({
            use axum::http::Method;
            use tower_http::cors::AllowOrigin;
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str == dashboard_origin
                        || origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                }))
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([
                    axum::http::HeaderName::from_static("content-type"),
                    axum::http::HeaderName::from_static("authorization"),
                    axum::http::HeaderName::from_static("x-session-token"),
                    axum::http::HeaderName::from_static("x-request-id"),
                ])
                .allow_credentials(true)
        })
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("sharegate listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Middleware: injects a unique X-Request-Id into every response so clients
/// can correlate errors with server logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: injects security headers into every response. The public
/// share pages are the sensitive surface here: never cached, never framed,
/// and the referrer (which carries the secret in the URL) is stripped.
async fn security_headers_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());
    headers.insert("X-Frame-Options", "DENY".parse().unwrap());
    headers.insert("Cache-Control", "no-store".parse().unwrap());
    headers.insert("Referrer-Policy", "no-referrer".parse().unwrap());
    headers.remove("Server");

    resp
}

async fn handle_token_command(db: &PgStore, cmd: cli::TokenCommands) -> anyhow::Result<()> {
    match cmd {
        cli::TokenCommands::List { tool, project_id } => {
            let tool = ToolKey::parse(&tool)
                .ok_or_else(|| anyhow::anyhow!("unknown tool {:?}", tool))?;
            let project_id = uuid::Uuid::parse_str(&project_id)?;
            let now = chrono::Utc::now();

            let tokens = db.list_share_tokens(tool, project_id).await?;
            if tokens.is_empty() {
                println!("No share tokens for {} in project {}", tool, project_id);
                return Ok(());
            }
            for token in tokens {
                println!(
                    "{}  {:<8}  created {}  expires {}",
                    token.id,
                    token.state(now).as_str(),
                    token.created_at.format("%Y-%m-%d"),
                    token.expires_at.format("%Y-%m-%d"),
                );
            }
            Ok(())
        }
        cli::TokenCommands::Revoke {
            project_id,
            token_id,
        } => {
            let project_id = uuid::Uuid::parse_str(&project_id)?;
            let token_id = uuid::Uuid::parse_str(&token_id)?;
            db.revoke_share_token(token_id, project_id, chrono::Utc::now())
                .await?;
            println!("Revoked {}", token_id);
            Ok(())
        }
    }
}
