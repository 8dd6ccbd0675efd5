use serde::{Deserialize, Serialize};

/// Capture request passed to the platform when joining a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
    /// Preferred capture width in pixels, applied to the video track only.
    pub ideal_width: Option<u32>,
}

impl MediaConstraints {
    pub fn requests_any(&self) -> bool {
        self.audio || self.video
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
            ideal_width: Some(1280),
        }
    }
}
