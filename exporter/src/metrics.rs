use crate::errors::Result;
use prometheus::{
    CounterVec, Encoder, GaugeVec, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

#[cfg(target_os = "linux")]
use prometheus::process_collector::ProcessCollector;

/// Label names shared by every sensor series.
pub const SENSOR_LABELS: [&str; 3] = ["id", "channel", "location"];

/// Every series the exporter publishes, behind one registry.
///
/// Constructed once at startup and shared between the ingest loop (the only
/// writer) and the HTTP endpoint (readers). Individual values are atomics
/// inside `prometheus`, so a scrape never observes a torn write.
#[derive(Clone)]
pub struct SensorMetrics {
    registry: Registry,
    pub packets_received: CounterVec,
    pub temperature: GaugeVec,
    pub humidity: GaugeVec,
    pub timestamp: GaugeVec,
    pub battery: GaugeVec,
    pub lines_total: IntCounter,
    pub invalid_lines_total: IntCounter,
    pub receiver_errors_total: IntCounterVec,
}

impl SensorMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let packets_received = CounterVec::new(
            Opts::new(
                "rtl_433_packets_received",
                "Packets (temperature messages) received.",
            ),
            &SENSOR_LABELS,
        )?;
        let temperature = GaugeVec::new(
            Opts::new("rtl_433_temperature_celsius", "Temperature in Celsius"),
            &SENSOR_LABELS,
        )?;
        let humidity = GaugeVec::new(
            Opts::new("rtl_433_humidity", "Relative Humidity (0-1.0)"),
            &SENSOR_LABELS,
        )?;
        let timestamp = GaugeVec::new(
            Opts::new(
                "rtl_433_timestamp_seconds",
                "Timestamp we received the message (Unix seconds)",
            ),
            &SENSOR_LABELS,
        )?;
        let battery = GaugeVec::new(
            Opts::new("rtl_433_battery", "Battery high (1) or low (0)."),
            &SENSOR_LABELS,
        )?;

        let lines_total = IntCounter::with_opts(Opts::new(
            "rtl_433_exporter_lines_total",
            "Lines read from the receiver",
        ))?;
        let invalid_lines_total = IntCounter::with_opts(Opts::new(
            "rtl_433_exporter_invalid_lines_total",
            "Lines dropped because they could not be decoded",
        ))?;
        let receiver_errors_total = IntCounterVec::new(
            Opts::new(
                "rtl_433_receiver_errors_total",
                "Packets the receiver rejected, by reported reason",
            ),
            &["error"],
        )?;
        let build_info = IntGaugeVec::new(
            Opts::new(
                "rtl_433_exporter_build_info",
                "Exporter build information, constant 1",
            ),
            &["version"],
        )?;
        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1);

        registry.register(Box::new(packets_received.clone()))?;
        registry.register(Box::new(temperature.clone()))?;
        registry.register(Box::new(humidity.clone()))?;
        registry.register(Box::new(timestamp.clone()))?;
        registry.register(Box::new(battery.clone()))?;
        registry.register(Box::new(lines_total.clone()))?;
        registry.register(Box::new(invalid_lines_total.clone()))?;
        registry.register(Box::new(receiver_errors_total.clone()))?;
        registry.register(Box::new(build_info))?;
        #[cfg(target_os = "linux")]
        registry.register(Box::new(ProcessCollector::for_self()))?;

        Ok(Self {
            registry,
            packets_received,
            temperature,
            humidity,
            timestamp,
            battery,
            lines_total,
            invalid_lines_total,
            receiver_errors_total,
        })
    }

    /// Renders all series in the Prometheus text exposition format.
    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        // TextEncoder only writes UTF-8.
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
