use anyhow::Result;
use axum::Router;
use clap::Parser;
use textsearch_server::build_app;
use std::net::SocketAddr;
use textsearch_core::{IndexConfig, IndexKind};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus path (JSON/JSONL file or directory)
    #[arg(long, default_value = "./data")]
    input: String,
    /// Index engine: sequential or parallel
    #[arg(long, env = "INDEX_ENGINE", default_value_t = IndexKind::Parallel)]
    engine: IndexKind,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app(&args.input, &IndexConfig::new(args.engine))?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
