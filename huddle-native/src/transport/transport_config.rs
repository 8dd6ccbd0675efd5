use serde::{Deserialize, Serialize};

/// Settings of the native WebRTC stack that have no browser counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeConfig {
    /// Gather 127.0.0.1 candidates as well. Needed when every party runs on
    /// one host without another usable interface.
    pub include_loopback: bool,
    /// Ignore the configured ICE servers and gather host candidates only.
    pub host_only: bool,
    /// Write placeholder frames into the local tracks so remote `on_track`
    /// callbacks fire.
    pub pump_samples: bool,
    pub stream_id: String,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            include_loopback: true,
            host_only: false,
            pump_samples: false,
            stream_id: "huddle-local".to_owned(),
        }
    }
}
