use rand::seq::SliceRandom;
use rand::Rng;

const TEMP_MIN_C: f64 = -30.0;
const TEMP_MAX_C: f64 = 50.0;
const HUMIDITY_MAX: i64 = 99;

/// Reasons the receiver firmware prints instead of a reading.
pub const RECEIVER_ERRORS: [&str; 5] = [
    "invalid device ID or channel",
    "temperature is out-of-range",
    "humidity is out-of-range",
    "temperature jumped too much",
    "humidity jumped too much",
];

/// One simulated F007TH transmitter.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub device: u8,
    pub channel: u8,
    pub low_battery: bool,
    pub temperature_c: f64,
    pub humidity: i64,
}

impl Sensor {
    pub fn random(rng: &mut impl Rng, channel: u8) -> Self {
        Self {
            device: rng.gen_range(1..=255),
            channel,
            low_battery: false,
            temperature_c: rng.gen_range(15.0..25.0),
            humidity: rng.gen_range(30..=60),
        }
    }

    /// Random walk, small enough that the receiver's jump filter never trips.
    pub fn step(&mut self, rng: &mut impl Rng) {
        let dt = rng.gen_range(-0.5..0.5);
        self.temperature_c = (self.temperature_c + dt).clamp(TEMP_MIN_C + 1.0, TEMP_MAX_C - 1.0);
        let dh = rng.gen_range(-1..=1);
        self.humidity = (self.humidity + dh).clamp(0, HUMIDITY_MAX);
        if !self.low_battery && rng.gen_bool(0.001) {
            self.low_battery = true;
        }
    }

    /// Reading in the receiver's exact line format, without terminator.
    pub fn line(&self) -> String {
        format!(
            concat!(
                "{{\"device\": {}, \"channel\": {}, \"low_battery\": {}, ",
                "\"temperature_c\": {:.2}, \"humidity\": {}}}"
            ),
            self.device, self.channel, self.low_battery, self.temperature_c, self.humidity
        )
    }
}

pub fn receiver_error_line(rng: &mut impl Rng) -> String {
    let reason = RECEIVER_ERRORS.choose(rng).copied().unwrap_or(RECEIVER_ERRORS[0]);
    format!("{{\"error\": \"{}\"}}", reason)
}

/// A reading cut short, as seen when the port is opened mid-line.
pub fn garbage_line(rng: &mut impl Rng, sensor: &Sensor) -> String {
    let line = sensor.line();
    let cut = rng.gen_range(1..line.len());
    line[..cut].to_string()
}
