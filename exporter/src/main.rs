use clap::Parser;
use rtl433_exporter::config::{usage_exit_code, Args, Config};
use rtl433_exporter::ingest::{run_ingest, StreamEnd};
use rtl433_exporter::metrics::SensorMetrics;
use rtl433_exporter::publish::Publisher;
use rtl433_exporter::{http, serial, EXIT_FATAL, EXIT_STREAM_ENDED};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::try_parse().unwrap_or_else(|e| {
        // Help and version go to stdout; usage errors to stderr.
        let _ = e.print();
        std::process::exit(usage_exit_code(&e));
    });

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_args(args).unwrap_or_else(|e| {
        error!("Invalid configuration: {}", e);
        std::process::exit(EXIT_FATAL);
    });

    info!("Starting rtl_433 exporter {}", env!("CARGO_PKG_VERSION"));
    info!("Serial port: {}", config.serial);
    info!("Metrics: http://{}{}", config.listen, config.metrics_path);
    info!("Channel matchers: {}", config.locations.len());

    let metrics = match SensorMetrics::new() {
        Ok(metrics) => Arc::new(metrics),
        Err(e) => {
            error!("Failed to register metrics: {}", e);
            std::process::exit(EXIT_FATAL);
        }
    };

    // Start HTTP server
    let listener = http::bind(config.listen).await.unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(EXIT_FATAL);
    });
    let app = http::create_router(&config.metrics_path, metrics.clone());
    let server_handle = tokio::spawn(http::serve(listener, app));

    let lines = serial::open_device(&config.serial).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(EXIT_FATAL);
    });

    // Device reads block, keep them off the async workers.
    let publisher = Publisher::new(metrics, config.locations);
    let ingest_handle = tokio::task::spawn_blocking(move || run_ingest(lines, &publisher));

    let code = tokio::select! {
        end = ingest_handle => {
            match end {
                Ok(StreamEnd::Closed) => error!("Serial stream closed"),
                Ok(StreamEnd::Failed(e)) => error!("Serial stream failed: {}", e),
                Err(e) => error!("Ingest task terminated: {}", e),
            }
            EXIT_STREAM_ENDED
        }
        served = server_handle => {
            match served {
                Ok(Ok(())) => error!("HTTP server terminated"),
                Ok(Err(e)) => error!("HTTP server error: {}", e),
                Err(e) => error!("HTTP server task terminated: {}", e),
            }
            EXIT_FATAL
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            0
        }
    };

    info!("Shutting down");
    std::process::exit(code);
}
