use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use voiceform::{create_router, AppState, Config};

#[derive(Debug, Parser)]
#[command(name = "voiceform", about = "Voice-response capture control service")]
struct Args {
    /// Configuration file (extension optional, resolved by the config crate)
    #[arg(long, default_value = "config/voiceform")]
    config: String,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut cfg = Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("Voiceform v0.1.0");
    info!("Loaded config: {}", cfg.service.name);
    info!("Widget engine: {}", cfg.widget.engine);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);

    let state = AppState::new(Arc::new(cfg));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
