use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use maxscale_admin::{AdminState, METRICS_PATH, exporter_router};
use maxscale_collector::{Collector, HttpJsonSource, ScrapeState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "maxscale_exporter", about = "Prometheus exporter for MaxScale")]
struct Cli {
    /// Address to get MaxScale statistics from.
    #[arg(long, env = "MAXSCALE_EXPORTER_ADDRESS", default_value = "127.0.0.1:8003")]
    address: String,

    /// Port the exporter listens on.
    #[arg(long, env = "MAXSCALE_EXPORTER_PORT", default_value = "9195")]
    port: u16,

    /// Pid file of the MaxScale process, enables maxscale_process_* metrics.
    #[arg(long, env = "MAXSCALE_EXPORTER_PIDFILE")]
    pidfile: Option<PathBuf>,

    #[arg(long, env = "MAXSCALE_EXPORTER_API_PREFIX", default_value = "/v1")]
    api_prefix: String,

    /// Used when the scraper does not announce its own timeout.
    #[arg(long, env = "MAXSCALE_EXPORTER_SCRAPE_TIMEOUT_SECS", default_value = "10")]
    scrape_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::from_default_env().add_directive("maxscale=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let source = HttpJsonSource::new(&cli.address, &cli.api_prefix)?;
    info!(url = %source.base_url(), "scraping maxscale json api");

    if let Some(pidfile) = &cli.pidfile {
        info!(pidfile = %pidfile.display(), "reading maxscale pid file for process metrics");
    }

    let collector = Collector::new(Arc::new(source), Arc::new(ScrapeState::new()));
    let state = AdminState::new(collector, cli.pidfile)
        .with_scrape_timeout(Duration::from_secs(cli.scrape_timeout_secs.max(1)));
    let app = exporter_router(Arc::new(state));

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("maxscale exporter listening on {addr}, metrics at {METRICS_PATH}");
    axum::serve(listener, app).await?;

    Ok(())
}
