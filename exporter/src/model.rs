use serde::{Deserialize, Serialize};

/// One temperature/humidity packet as printed by the receiver, e.g.
/// `{"device": 17, "channel": 3, "low_battery": true, "temperature_c": 21.94, "humidity": 44}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub device: u8,
    pub channel: u8,
    #[serde(default)]
    pub low_battery: bool,
    #[serde(default)]
    pub temperature_c: f64,
    /// Divided by 100 when published.
    #[serde(default)]
    pub humidity: i64,
}

/// Packet the receiver decoded but refused to forward, e.g.
/// `{"error": "humidity jumped too much"}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReceiverError {
    pub error: String,
}

/// Reasons the receiver firmware reports; anything else is labelled `other`.
pub const RECEIVER_ERROR_REASONS: [&str; 5] = [
    "invalid device ID or channel",
    "temperature is out-of-range",
    "humidity is out-of-range",
    "temperature jumped too much",
    "humidity jumped too much",
];

impl ReceiverError {
    /// Label value for this report, drawn from a fixed set so corrupted
    /// lines cannot grow the series count.
    pub fn reason_label(&self) -> &'static str {
        RECEIVER_ERROR_REASONS
            .iter()
            .find(|&&known| known == self.error)
            .copied()
            .unwrap_or("other")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Reading(Reading),
    ReceiverError(ReceiverError),
}
