use serde::Deserialize;

/// Output device volume capabilities as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeviceVolume {
    #[serde(default, alias = "maxVolume")]
    pub max_volume: u32,
    #[serde(default, alias = "currentVolume")]
    pub current_volume: u32,
    #[serde(default, alias = "volumeGain")]
    pub volume_gain: i32,
    #[serde(default = "supported_by_default")]
    pub supported: bool,
}

fn supported_by_default() -> bool {
    true
}

impl Default for DeviceVolume {
    fn default() -> Self {
        Self {
            max_volume: 0,
            current_volume: 0,
            volume_gain: 0,
            supported: supported_by_default(),
        }
    }
}
