mod surfaces;

pub use surfaces::{HeadlessSurfaces, RemoteSurface};

use bytes::Bytes;
use huddle_core::{LocalStream, MediaConstraints};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::debug;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

const FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// Synthetic capture: one Opus and/or one VP8 track, no real device.
#[derive(Clone)]
pub struct NativeLocalStream {
    tracks: Vec<Arc<TrackLocalStaticSample>>,
}

impl NativeLocalStream {
    pub fn synthetic(constraints: &MediaConstraints, stream_id: &str) -> Self {
        let mut tracks = Vec::new();
        if constraints.audio {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    ..Default::default()
                },
                "audio".to_owned(),
                stream_id.to_owned(),
            )));
        }
        if constraints.video {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90000,
                    ..Default::default()
                },
                "video".to_owned(),
                stream_id.to_owned(),
            )));
        }
        Self { tracks }
    }

    /// Writes placeholder frames into every track until the stream and all
    /// peers holding its tracks are gone.
    pub fn start_pump(&self) {
        for track in &self.tracks {
            let weak: Weak<TrackLocalStaticSample> = Arc::downgrade(track);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(FRAME_INTERVAL);
                let frame = Bytes::from_static(&[0u8; 160]);
                loop {
                    ticker.tick().await;
                    let Some(track) = weak.upgrade() else {
                        break;
                    };
                    let sample = Sample {
                        data: frame.clone(),
                        duration: FRAME_INTERVAL,
                        ..Default::default()
                    };
                    if let Err(e) = track.write_sample(&sample).await {
                        debug!("Sample pump for {} stopped: {}", track.id(), e);
                        break;
                    }
                }
            });
        }
    }
}

impl LocalStream for NativeLocalStream {
    type Track = Arc<TrackLocalStaticSample>;

    fn tracks(&self) -> Vec<Arc<TrackLocalStaticSample>> {
        self.tracks.clone()
    }
}
