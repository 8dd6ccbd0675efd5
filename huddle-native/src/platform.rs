use async_trait::async_trait;
use huddle_core::{
    CallError, CallPlatform, IceServerConfig, MediaConstraints, ParticipantId, PeerEventSink,
    PeerSetup,
};
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::api::{API, APIBuilder};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

use crate::media::{HeadlessSurfaces, NativeLocalStream, RemoteSurface};
use crate::transport::{NativeConfig, NativePeer};

fn rtc_configuration(config: &NativeConfig, servers: &[IceServerConfig]) -> RTCConfiguration {
    if config.host_only {
        return RTCConfiguration::default();
    }
    RTCConfiguration {
        ice_servers: servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
            })
            .collect(),
        ..Default::default()
    }
}

/// Native runtime: webrtc-rs connections, synthetic capture and headless
/// surfaces.
pub struct NativePlatform {
    api: API,
    config: NativeConfig,
    surfaces: HeadlessSurfaces,
}

impl NativePlatform {
    pub fn new(config: NativeConfig) -> Result<Self, CallError> {
        let setup_err = |e: webrtc::Error| CallError::Config(format!("webrtc setup failed: {e}"));

        let mut m = MediaEngine::default();
        m.register_default_codecs().map_err(setup_err)?;
        let registry = register_default_interceptors(Registry::new(), &mut m).map_err(setup_err)?;

        let mut settings = SettingEngine::default();
        settings.set_include_loopback_candidate(config.include_loopback);

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .with_setting_engine(settings)
            .build();

        Ok(Self {
            api,
            config,
            surfaces: HeadlessSurfaces::default(),
        })
    }

    pub fn surfaces(&self) -> HeadlessSurfaces {
        self.surfaces.clone()
    }
}

#[async_trait(?Send)]
impl CallPlatform for NativePlatform {
    type Track = Arc<TrackLocalStaticSample>;
    type LocalStream = NativeLocalStream;
    type RemoteStream = Arc<TrackRemote>;
    type Peer = NativePeer;

    async fn acquire_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<NativeLocalStream, CallError> {
        if !constraints.requests_any() {
            return Err(CallError::MediaAccess(
                "neither audio nor video requested".into(),
            ));
        }
        let stream = NativeLocalStream::synthetic(constraints, &self.config.stream_id);
        if self.config.pump_samples {
            stream.start_pump();
        }
        info!("Synthetic local media ready (audio: {}, video: {})", constraints.audio, constraints.video);
        Ok(stream)
    }

    fn attach_local_preview(&self, _stream: &NativeLocalStream) -> Result<(), CallError> {
        self.surfaces.show_local();
        Ok(())
    }

    async fn create_peer(
        &self,
        setup: PeerSetup<'_>,
        events: PeerEventSink<Arc<TrackRemote>>,
    ) -> Result<NativePeer, CallError> {
        let rtc_config = rtc_configuration(&self.config, setup.ice_servers);
        let pc = self
            .api
            .new_peer_connection(rtc_config)
            .await
            .map_err(|e| CallError::negotiation(&setup.key.participant, e.to_string()))?;
        debug!("Created peer connection {} as {:?}", setup.key, setup.role);

        Ok(NativePeer::new(Arc::new(pc), setup.role, events))
    }

    fn attach_remote_stream(
        &self,
        participant: &ParticipantId,
        track: Arc<TrackRemote>,
    ) -> Result<(), CallError> {
        self.surfaces.attach(
            participant,
            RemoteSurface {
                track_id: track.id(),
                kind: track.kind().to_string(),
                codec: track.codec().capability.mime_type,
            },
        );
        Ok(())
    }

    fn detach_remote_stream(&self, participant: &ParticipantId) {
        self.surfaces.detach(participant);
    }
}
