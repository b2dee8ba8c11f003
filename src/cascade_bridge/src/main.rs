use cascade_bridge::api::build_router;
use cascade_bridge::core::{AppState, BridgeConfig};
use cascade_bridge::lifecycle::graceful_shutdown_signal;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(config: &BridgeConfig) {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
    std::mem::forget(guard); // keep the writer alive for the process lifetime

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cascade_bridge=info,tower_http=info".into());

    if config.is_json_log_format() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new(
                "cascade_bridge".into(),
                non_blocking,
            ))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_timer(ChronoUtc::new("%T%.3f".to_string())),
            )
            .init();
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(target: "panic", location = %location, payload = %payload, "panic occurred");
    }));
}

#[tokio::main]
async fn main() {
    let config = BridgeConfig::parse();
    init_tracing(&config);
    install_panic_hook();

    info!(port = config.listen_port, log_format = %config.log_format, "starting cascade_bridge");

    let state = Arc::new(AppState::new(config.clone()));
    let app = build_router(state);

    let ipv6_addr = SocketAddr::from(([0, 0, 0, 0, 0, 0, 0, 1], config.listen_port));
    let ipv4_addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));

    let listener = match TcpListener::bind(ipv6_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            info!("ipv6 bind failed ({e}), falling back to ipv4");
            match TcpListener::bind(ipv4_addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("failed to bind loopback port {}: {e}", config.listen_port);
                    std::process::exit(1);
                }
            }
        }
    };

    info!(addr = %listener.local_addr().unwrap(), "cascade_bridge listening");

    let shutdown_flag = Arc::new(AtomicBool::new(false));
    if let Err(e) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(graceful_shutdown_signal(shutdown_flag))
        .await
    {
        error!("server error: {e}");
        std::process::exit(1);
    }

    info!("cascade_bridge shut down cleanly");
}
