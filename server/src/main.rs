use anyhow::Result;
use axum::Router;
use clap::Parser;
use ngram_core::GeneratorConfig;
use server::{build_app, load_searcher, ServeOptions};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Site base directory holding config/generator.toml and generated/
    #[arg(long, short = 'd', default_value = ".")]
    directory: PathBuf,
    /// Index file to serve instead of generated/indexes.*
    #[arg(long)]
    index: Option<PathBuf>,
    /// Host to bind (overrides the config file)
    #[arg(long)]
    host: Option<String>,
    /// Port to bind (overrides the config file)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = GeneratorConfig::load(&args.directory)?;

    let opts = ServeOptions { directory: args.directory.clone(), index: args.index.clone() };
    let searcher = load_searcher(&config, &opts)?;
    let app: Router = build_app(searcher);

    let host = args.host.unwrap_or_else(|| config.host.clone());
    let port = args.port.unwrap_or(config.port);
    let listener = TcpListener::bind((host.as_str(), port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
