use crate::errors::{Error, Result};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// A `"<channel>,<location>"` entry from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMatcher {
    pub channel: u8,
    pub location: String,
}

impl FromStr for ChannelMatcher {
    type Err = Error;

    fn from_str(entry: &str) -> Result<Self> {
        let invalid = |reason: String| Error::ChannelMatcher {
            entry: entry.to_string(),
            reason,
        };

        // Only the first comma separates, locations may contain commas.
        let (channel, location) = entry
            .split_once(',')
            .ok_or_else(|| invalid("expected <channel>,<location>".to_string()))?;

        let channel = channel
            .trim()
            .parse::<u8>()
            .map_err(|e| invalid(format!("channel {:?}: {}", channel.trim(), e)))?;

        Ok(Self {
            channel,
            location: location.to_string(),
        })
    }
}

/// Channel to location lookup, fixed once startup is complete.
#[derive(Debug, Clone, Default)]
pub struct ChannelLocations {
    by_channel: HashMap<u8, String>,
}

impl ChannelLocations {
    pub fn new(matchers: impl IntoIterator<Item = ChannelMatcher>) -> Self {
        let mut by_channel = HashMap::new();
        for m in matchers {
            if let Some(previous) = by_channel.insert(m.channel, m.location) {
                debug!(
                    "Channel {} was mapped to {:?}, later matcher overrides it",
                    m.channel, previous
                );
            }
        }
        Self { by_channel }
    }

    /// Location for `channel`, empty when the channel is not configured.
    pub fn location(&self, channel: u8) -> &str {
        self.by_channel
            .get(&channel)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.by_channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_channel.is_empty()
    }
}
