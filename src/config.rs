use std::path::PathBuf;
use serde::{Deserialize, Serialize};
/// Which acquisition backend to open.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoardKind {
    /// Software signal generator, no hardware required.
    Synthetic,
    /// OpenBCI Cyton over a serial dongle.
    Cyton { port: String },
}
/// Everything `SampleSource::open` needs; passed in explicitly instead of
/// living as global literals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub board: BoardKind,
    pub sample_rate_hz: f64,
    pub num_channels: usize,
}
impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            board: BoardKind::Synthetic,
            sample_rate_hz: 250.0,
            num_channels: 8,
        }
    }
}
/// Role of one device channel in the montage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelRole {
    Eeg,
    Eog,
    Unused,
}
/// Configurable channel-to-role table. Indices refer to device channel order,
/// i.e. the recording columns after the reserved index column is dropped.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelMap {
    pub eeg: Vec<usize>,
    pub eog: Vec<usize>,
}
impl Default for ChannelMap {
    fn default() -> Self {
        // Montage of the reference setup: occipital EEG on 5..7, EOG on 1..2.
        Self {
            eeg: vec![5, 6, 7],
            eog: vec![1, 2],
        }
    }
}
impl ChannelMap {
    pub fn role_of(&self, channel: usize) -> ChannelRole {
        if self.eeg.contains(&channel) {
            ChannelRole::Eeg
        } else if self.eog.contains(&channel) {
            ChannelRole::Eog
        } else {
            ChannelRole::Unused
        }
    }
    /// Channel used for resting-state analysis: the first EEG entry.
    pub fn rest_channel(&self) -> Option<usize> {
        self.eeg.first().copied()
    }
}
/// Per-session parameters owned by the session controller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub device: DeviceConfig,
    pub channel_map: ChannelMap,
    /// Recording sink; opened in append mode on every start.
    pub recording_path: PathBuf,
    /// Width of the live display window in seconds.
    pub window_seconds: f64,
    /// Poll cadence for the acquisition tick.
    pub poll_interval_ms: u64,
    /// Opaque label supplied by the registration layer (patient/session id).
    pub label: String,
}
impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            channel_map: ChannelMap::default(),
            recording_path: PathBuf::from("Signal-EEG.csv"),
            window_seconds: 5.0,
            poll_interval_ms: 50,
            label: String::new(),
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn default_map_matches_reference_montage() {
        let map = ChannelMap::default();
        assert_eq!(map.rest_channel(), Some(5));
        assert_eq!(map.role_of(6), ChannelRole::Eeg);
        assert_eq!(map.role_of(1), ChannelRole::Eog);
        assert_eq!(map.role_of(0), ChannelRole::Unused);
    }
    #[test]
    fn session_config_round_trips_through_json() {
        let config = SessionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.device.sample_rate_hz, 250.0);
        assert_eq!(back.poll_interval_ms, 50);
    }
}
