use async_trait::async_trait;
use huddle_core::{
    CallError, CallPlatform, LocalStream, MediaConstraints, ParticipantId, PeerEventSink,
    PeerSetup,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wasm_bindgen::JsCast;

mod create_pc_impl;
mod media_impl;
mod peer;

pub use peer::BrowserPeer;

/// Element ids the call renders into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceConfig {
    pub local_element_id: String,
    /// Remote video of participant `id` renders into `{prefix}{id}`.
    pub remote_element_prefix: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            local_element_id: "local-video".into(),
            remote_element_prefix: "video-remote-".into(),
        }
    }
}

impl SurfaceConfig {
    pub fn remote_element_id(&self, participant: &ParticipantId) -> String {
        format!("{}{}", self.remote_element_prefix, participant)
    }
}

/// A local track together with the stream it is sent as part of.
#[derive(Clone)]
pub struct BrowserTrack {
    pub track: web_sys::MediaStreamTrack,
    pub stream: web_sys::MediaStream,
}

#[derive(Clone)]
pub struct BrowserLocalStream {
    stream: web_sys::MediaStream,
}

impl BrowserLocalStream {
    pub fn stream(&self) -> &web_sys::MediaStream {
        &self.stream
    }
}

impl LocalStream for BrowserLocalStream {
    type Track = BrowserTrack;

    fn tracks(&self) -> Vec<BrowserTrack> {
        self.stream
            .get_tracks()
            .iter()
            .filter_map(|value| value.dyn_into::<web_sys::MediaStreamTrack>().ok())
            .map(|track| BrowserTrack {
                track,
                stream: self.stream.clone(),
            })
            .collect()
    }
}

/// Browser runtime: `getUserMedia`, `RTCPeerConnection` and `<video>` surfaces.
pub struct BrowserPlatform {
    window: web_sys::Window,
    document: web_sys::Document,
    surfaces: SurfaceConfig,
}

impl BrowserPlatform {
    pub fn new(surfaces: SurfaceConfig) -> Result<Self, CallError> {
        let window =
            web_sys::window().ok_or_else(|| CallError::Surface("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| CallError::Surface("window has no document".into()))?;
        Ok(Self {
            window,
            document,
            surfaces,
        })
    }

    pub fn surfaces(&self) -> &SurfaceConfig {
        &self.surfaces
    }
}

#[async_trait(?Send)]
impl CallPlatform for BrowserPlatform {
    type Track = BrowserTrack;
    type LocalStream = BrowserLocalStream;
    type RemoteStream = web_sys::MediaStream;
    type Peer = BrowserPeer;

    async fn acquire_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<BrowserLocalStream, CallError> {
        let stream = media_impl::get_user_media(&self.window, constraints).await?;
        info!("Local media acquired: {} tracks", stream.get_tracks().length());
        Ok(BrowserLocalStream { stream })
    }

    fn attach_local_preview(&self, stream: &BrowserLocalStream) -> Result<(), CallError> {
        let video = media_impl::video_element(&self.document, &self.surfaces.local_element_id)?;
        video.set_muted(true);
        video.set_src_object(Some(&stream.stream));
        Ok(())
    }

    async fn create_peer(
        &self,
        setup: PeerSetup<'_>,
        events: PeerEventSink<web_sys::MediaStream>,
    ) -> Result<BrowserPeer, CallError> {
        debug!("Creating RTCPeerConnection {} as {:?}", setup.key, setup.role);
        create_pc_impl::create_pc(&setup, events)
    }

    fn attach_remote_stream(
        &self,
        participant: &ParticipantId,
        stream: web_sys::MediaStream,
    ) -> Result<(), CallError> {
        let id = self.surfaces.remote_element_id(participant);
        let video = media_impl::video_element(&self.document, &id)?;
        video.set_src_object(Some(&stream));
        Ok(())
    }

    fn detach_remote_stream(&self, participant: &ParticipantId) {
        let id = self.surfaces.remote_element_id(participant);
        if let Ok(video) = media_impl::video_element(&self.document, &id) {
            video.set_src_object(None);
        }
    }
}
