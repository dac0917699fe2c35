mod telemetry;

use clap::Parser;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;
use telemetry::{garbage_line, receiver_error_line, Sensor};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

/// Emits F007TH receiver output (JSON lines) for exercising the exporter.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Lines per second
    #[arg(long, env = "RATE", default_value_t = 1.0)]
    rate: f64,

    /// Transmitters per channel
    #[arg(long, env = "DEVICES", default_value_t = 1)]
    devices: usize,

    /// Channels in use (the F007TH has 1-8)
    #[arg(
        long,
        env = "CHANNELS",
        default_value_t = 3,
        value_parser = clap::value_parser!(u8).range(1..=8)
    )]
    channels: u8,

    /// Share of lines replaced by receiver error reports
    #[arg(long, default_value_t = 0.05)]
    error_ratio: f64,

    /// Share of lines cut short
    #[arg(long, default_value_t = 0.01)]
    garbage_ratio: f64,

    /// Stop after this many lines
    #[arg(long)]
    count: Option<u64>,

    /// File or pty to write to instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging; stdout carries the data.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let period = tick_period(args.rate).unwrap_or_else(|| {
        error!("--rate must be positive and at most 1000000 lines/s, got {}", args.rate);
        std::process::exit(2);
    });

    info!(
        "Starting receiver simulator: {} lines/s, {} channel(s) x {} device(s)",
        args.rate, args.channels, args.devices
    );

    let mut out: Box<dyn AsyncWrite + Unpin + Send> = match &args.output {
        Some(path) => {
            let opened = tokio::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .await;
            match opened {
                Ok(file) => {
                    info!("Writing to {}", path.display());
                    Box::new(file)
                }
                Err(e) => {
                    error!("Failed to open {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => Box::new(tokio::io::stdout()),
    };

    let mut rng = rand::thread_rng();
    let mut sensors: Vec<Sensor> = (1..=args.channels)
        .flat_map(|channel| std::iter::repeat(channel).take(args.devices.max(1)))
        .map(|channel| Sensor::random(&mut rng, channel))
        .collect();
    for s in &sensors {
        info!("Sensor device={} channel={}", s.device, s.channel);
    }

    let mut ticker = tokio::time::interval(period);
    let mut counter = 0u64;

    while args.count.map_or(true, |limit| counter < limit) {
        ticker.tick().await;

        let idx = (counter % sensors.len() as u64) as usize;
        let sensor = &mut sensors[idx];
        sensor.step(&mut rng);

        let roll: f64 = rng.gen();
        let line = if roll < args.error_ratio {
            receiver_error_line(&mut rng)
        } else if roll < args.error_ratio + args.garbage_ratio {
            garbage_line(&mut rng, sensor)
        } else {
            sensor.line()
        };

        // The receiver prints with println, CRLF terminated.
        if let Err(e) = out.write_all(format!("{}\r\n", line).as_bytes()).await {
            error!("Write failed: {}", e);
            std::process::exit(1);
        }
        if let Err(e) = out.flush().await {
            error!("Flush failed: {}", e);
            std::process::exit(1);
        }
        counter += 1;

        // Log progress periodically
        if counter % 1000 == 0 {
            info!("Emitted {} lines", counter);
        }
    }

    info!("Emitted {} lines, done", counter);
}

/// Interval between lines, `None` when the rate has no usable period.
fn tick_period(rate: f64) -> Option<Duration> {
    if !(rate > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / rate)
        .ok()
        .filter(|period| *period >= Duration::from_micros(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_period() {
        assert_eq!(tick_period(1.0), Some(Duration::from_secs(1)));
        assert_eq!(tick_period(4.0), Some(Duration::from_millis(250)));
        assert_eq!(tick_period(8.0), Some(Duration::from_millis(125)));
    }

    #[test]
    fn test_unusable_rates_rejected() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-20, 1e-300, 1e9] {
            assert_eq!(tick_period(rate), None, "rate {}", rate);
        }
    }
}
