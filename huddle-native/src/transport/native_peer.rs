use async_trait::async_trait;
use huddle_core::{
    CallError, IceCandidate, PeerConnection, PeerEvent, PeerEventSink, PeerKey, PeerLinkState,
    PeerRole, SdpKind, SessionDescription,
};
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// `PeerConnection` over a webrtc-rs connection. Clones share the
/// underlying connection.
#[derive(Clone)]
pub struct NativePeer {
    key: PeerKey,
    pc: Arc<RTCPeerConnection>,
}

fn link_state(state: RTCPeerConnectionState) -> PeerLinkState {
    match state {
        RTCPeerConnectionState::Connecting => PeerLinkState::Connecting,
        RTCPeerConnectionState::Connected => PeerLinkState::Connected,
        RTCPeerConnectionState::Disconnected => PeerLinkState::Disconnected,
        RTCPeerConnectionState::Failed => PeerLinkState::Failed,
        RTCPeerConnectionState::Closed => PeerLinkState::Closed,
        _ => PeerLinkState::New,
    }
}

pub(crate) fn to_candidate(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}

pub(crate) fn to_candidate_init(candidate: IceCandidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_m_line_index,
        username_fragment: candidate.username_fragment,
    }
}

impl NativePeer {
    /// Wires the connection callbacks into `events`. Negotiation-needed is
    /// only observed on offering connections.
    pub(crate) fn new(
        pc: Arc<RTCPeerConnection>,
        role: PeerRole,
        events: PeerEventSink<Arc<TrackRemote>>,
    ) -> Self {
        let key = events.key().clone();

        let state_sink = events.clone();
        pc.on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
            let sink = state_sink.clone();
            Box::pin(async move {
                info!("Peer connection state changed for {}: {}", sink.key(), s);
                sink.emit(PeerEvent::LinkState(link_state(s)));
            })
        }));

        let ice_sink = events.clone();
        pc.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let sink = ice_sink.clone();
            Box::pin(async move {
                let Some(candidate) = c else {
                    sink.emit(PeerEvent::GatheringComplete);
                    return;
                };
                match candidate.to_json() {
                    Ok(init) => {
                        sink.emit(PeerEvent::IceCandidate(to_candidate(init)));
                    }
                    Err(e) => debug!("Dropping unserializable candidate on {}: {}", sink.key(), e),
                }
            })
        }));

        let track_sink = events.clone();
        pc.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let sink = track_sink.clone();
                Box::pin(async move {
                    debug!("Remote {} track on {}", track.kind(), sink.key());
                    sink.emit(PeerEvent::TrackReceived(track));
                })
            },
        ));

        if role == PeerRole::Offerer {
            let negotiation_sink = events;
            pc.on_negotiation_needed(Box::new(move || {
                let sink = negotiation_sink.clone();
                Box::pin(async move {
                    sink.emit(PeerEvent::NegotiationNeeded);
                })
            }));
        }

        Self { key, pc }
    }

    pub fn connection(&self) -> &Arc<RTCPeerConnection> {
        &self.pc
    }

    fn fail(&self, err: webrtc::Error) -> CallError {
        CallError::negotiation(&self.key.participant, err.to_string())
    }

    fn encode_description(&self, desc: SessionDescription) -> Result<RTCSessionDescription, CallError> {
        let converted = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp),
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp),
            SdpKind::Pranswer => RTCSessionDescription::pranswer(desc.sdp),
            SdpKind::Rollback => {
                return Err(CallError::negotiation(
                    &self.key.participant,
                    "rollback is not supported",
                ));
            }
        };
        converted.map_err(|e| self.fail(e))
    }

    fn decode_description(&self, desc: RTCSessionDescription) -> Result<SessionDescription, CallError> {
        let kind = match desc.sdp_type {
            RTCSdpType::Offer => SdpKind::Offer,
            RTCSdpType::Answer => SdpKind::Answer,
            RTCSdpType::Pranswer => SdpKind::Pranswer,
            RTCSdpType::Rollback => SdpKind::Rollback,
            other => {
                return Err(CallError::negotiation(
                    &self.key.participant,
                    format!("unexpected description type {other}"),
                ));
            }
        };
        Ok(SessionDescription {
            kind,
            sdp: desc.sdp,
        })
    }
}

#[async_trait(?Send)]
impl PeerConnection for NativePeer {
    type Track = Arc<TrackLocalStaticSample>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), CallError> {
        let desc = self.encode_description(desc)?;
        self.pc
            .set_remote_description(desc)
            .await
            .map_err(|e| self.fail(e))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), CallError> {
        let desc = self.encode_description(desc)?;
        self.pc
            .set_local_description(desc)
            .await
            .map_err(|e| self.fail(e))
    }

    async fn create_offer(&self) -> Result<SessionDescription, CallError> {
        let offer = self.pc.create_offer(None).await.map_err(|e| self.fail(e))?;
        self.decode_description(offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription, CallError> {
        let answer = self.pc.create_answer(None).await.map_err(|e| self.fail(e))?;
        self.decode_description(answer)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), CallError> {
        self.pc
            .add_ice_candidate(to_candidate_init(candidate))
            .await
            .map_err(|e| self.fail(e))
    }

    async fn add_track(&self, track: &Arc<TrackLocalStaticSample>) -> Result<(), CallError> {
        let track: Arc<dyn TrackLocal + Send + Sync> = track.clone();
        self.pc.add_track(track).await.map_err(|e| self.fail(e))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), CallError> {
        self.pc.close().await.map_err(|e| self.fail(e))
    }
}
