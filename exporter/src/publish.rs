use crate::locations::ChannelLocations;
use crate::metrics::SensorMetrics;
use crate::model::Reading;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Writes decoded readings into the sensor series.
pub struct Publisher {
    metrics: Arc<SensorMetrics>,
    locations: ChannelLocations,
}

impl Publisher {
    pub fn new(metrics: Arc<SensorMetrics>, locations: ChannelLocations) -> Self {
        Self { metrics, locations }
    }

    pub fn metrics(&self) -> &SensorMetrics {
        &self.metrics
    }

    /// `(id, channel, location)` label values for a reading.
    pub fn labels_for(&self, reading: &Reading) -> [String; 3] {
        [
            reading.device.to_string(),
            reading.channel.to_string(),
            self.locations.location(reading.channel).to_string(),
        ]
    }

    pub fn publish(&self, reading: &Reading) {
        self.publish_at(reading, Utc::now());
    }

    pub fn publish_at(&self, reading: &Reading, received_at: DateTime<Utc>) {
        let labels = self.labels_for(reading);
        let labels = [labels[0].as_str(), labels[1].as_str(), labels[2].as_str()];
        let m = &self.metrics;

        m.packets_received.with_label_values(&labels).inc();
        m.timestamp
            .with_label_values(&labels)
            .set(received_at.timestamp_millis() as f64 / 1000.0);
        m.temperature
            .with_label_values(&labels)
            .set(reading.temperature_c);
        m.humidity
            .with_label_values(&labels)
            .set(reading.humidity as f64 / 100.0);
        // Exported as "battery OK", the inverse of the receiver's flag.
        m.battery
            .with_label_values(&labels)
            .set(if reading.low_battery { 0.0 } else { 1.0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::ChannelMatcher;
    use chrono::TimeZone;

    fn publisher(matchers: &[&str]) -> Publisher {
        let locations = ChannelLocations::new(
            matchers
                .iter()
                .map(|m| m.parse::<ChannelMatcher>().unwrap()),
        );
        Publisher::new(Arc::new(SensorMetrics::new().unwrap()), locations)
    }

    fn bedroom_reading(low_battery: bool) -> Reading {
        Reading {
            device: 1,
            channel: 2,
            low_battery,
            temperature_c: 21.5,
            humidity: 45,
        }
    }

    const BEDROOM: [&str; 3] = ["1", "2", "Bedroom"];

    #[test]
    fn test_labels_include_location() {
        let p = publisher(&["2,Bedroom"]);
        assert_eq!(p.labels_for(&bedroom_reading(false)), BEDROOM.map(String::from));
    }

    #[test]
    fn test_unknown_channel_has_empty_location() {
        let p = publisher(&["3,Kitchen"]);
        assert_eq!(
            p.labels_for(&bedroom_reading(false)),
            ["1".to_string(), "2".to_string(), String::new()]
        );
    }

    #[test]
    fn test_publish_sets_all_series() {
        let p = publisher(&["2,Bedroom"]);
        let at = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        p.publish_at(&bedroom_reading(false), at);

        let m = p.metrics();
        assert_eq!(m.packets_received.with_label_values(&BEDROOM).get(), 1.0);
        assert_eq!(m.temperature.with_label_values(&BEDROOM).get(), 21.5);
        assert_eq!(m.humidity.with_label_values(&BEDROOM).get(), 0.45);
        assert_eq!(m.battery.with_label_values(&BEDROOM).get(), 1.0);
        assert_eq!(m.timestamp.with_label_values(&BEDROOM).get(), 1_700_000_000.25);
    }

    #[test]
    fn test_low_battery_exports_zero() {
        let p = publisher(&["2,Bedroom"]);
        p.publish(&bedroom_reading(true));
        assert_eq!(p.metrics().battery.with_label_values(&BEDROOM).get(), 0.0);
    }

    #[test]
    fn test_counter_accumulates_and_gauges_keep_last() {
        let p = publisher(&["2,Bedroom"]);
        p.publish(&bedroom_reading(false));
        p.publish(&Reading {
            temperature_c: 19.0,
            humidity: 60,
            ..bedroom_reading(true)
        });

        let m = p.metrics();
        assert_eq!(m.packets_received.with_label_values(&BEDROOM).get(), 2.0);
        assert_eq!(m.temperature.with_label_values(&BEDROOM).get(), 19.0);
        assert_eq!(m.humidity.with_label_values(&BEDROOM).get(), 0.6);
        assert_eq!(m.battery.with_label_values(&BEDROOM).get(), 0.0);
    }

    #[test]
    fn test_timestamp_is_current_time() {
        let p = publisher(&[]);
        let before = Utc::now().timestamp() as f64;
        p.publish(&bedroom_reading(false));
        let after = Utc::now().timestamp() as f64 + 1.0;

        let ts = p.metrics().timestamp.with_label_values(&["1", "2", ""]).get();
        assert!(ts >= before && ts <= after, "{} not in [{}, {}]", ts, before, after);
    }

    #[test]
    fn test_registry_is_read_per_publisher() {
        let office = publisher(&["2,Office"]);
        office.publish(&bedroom_reading(false));
        assert_eq!(
            office
                .metrics()
                .packets_received
                .with_label_values(&["1", "2", "Office"])
                .get(),
            1.0
        );
        let text = office.metrics().gather().unwrap();
        assert!(!text.contains("Bedroom"));
    }
}
