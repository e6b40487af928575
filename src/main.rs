use blobcast::config::ServerConfig;
use blobcast::infrastructure::{database, storage, workspace};
use blobcast::services::events::EventHub;
use blobcast::{AppState, create_app};
use clap::Parser;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "blobcast", about = "Streaming file store with live change feed")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blobcast=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = ServerConfig::from_env();

    info!("🚀 Starting blobcast...");

    // Startup is a strict sequence; a failed stage aborts the process
    // before the listener ever opens.

    // 1. Staging workspace
    workspace::prepare_workspace(&config).await?;

    // 2. Backing store
    let db = database::setup_database(&config).await?;
    let store = storage::setup_storage(db.clone(), &config);

    // 3. Observer hub
    let events = Arc::new(EventHub::new(config.event_buffer));

    let state = AppState {
        db,
        storage: store,
        events,
        config: config.clone(),
    };

    // 4. Request listener
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-"),
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!("📤 {} after {:?}", response.status(), latency);
            },
        );

    let app = create_app(state)
        .layer(trace)
        .layer(axum::extract::DefaultBodyLimit::max(config.max_upload_size));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        signal::ctrl_c().await.expect("Ctrl+C handler installation");
    };

    #[cfg(unix)]
    let sigterm = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("⌨️  Ctrl+C received, draining connections..."),
        _ = sigterm => info!("💤 SIGTERM received, draining connections..."),
    }
}
