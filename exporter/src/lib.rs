//! Republishes rtl_433 F007TH temperature/humidity readings, printed as JSON
//! lines by a serial receiver, as Prometheus metrics.
//!
//! Data flows one way: [`serial::LineReader`] pulls lines from the device,
//! [`decode::decode`] turns each into a [`model::Frame`], and
//! [`publish::Publisher`] writes readings into [`metrics::SensorMetrics`],
//! which [`http::create_router`] renders on every scrape.

pub mod config;
pub mod decode;
pub mod errors;
pub mod http;
pub mod ingest;
pub mod locations;
pub mod metrics;
pub mod model;
pub mod publish;
pub mod serial;

/// Exit status for configuration, device open and HTTP listener failures.
pub const EXIT_FATAL: i32 = 1;

/// Exit status once the device stream has closed or failed, so a supervisor
/// knows to restart the exporter.
pub const EXIT_STREAM_ENDED: i32 = 2;
