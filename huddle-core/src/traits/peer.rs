use crate::error::CallError;
use crate::model::{IceCandidate, IceServerConfig, ParticipantId, SessionDescription};
use async_trait::async_trait;
use futures::channel::mpsc;
use std::fmt;

/// The native negotiation object of one peer connection.
#[async_trait(?Send)]
pub trait PeerConnection: Clone + 'static {
    type Track;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), CallError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), CallError>;

    async fn create_offer(&self) -> Result<SessionDescription, CallError>;

    async fn create_answer(&self) -> Result<SessionDescription, CallError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), CallError>;

    async fn add_track(&self, track: &Self::Track) -> Result<(), CallError>;

    async fn close(&self) -> Result<(), CallError>;
}

/// Identity of one peer connection instance. The generation changes every
/// time the participant's connection is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerKey {
    pub participant: ParticipantId,
    pub generation: u64,
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.participant, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    /// Sends the offer once the platform asks for negotiation.
    Offerer,
    /// Answers a remote offer; never reacts to negotiation-needed.
    Answerer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerLinkState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

pub struct PeerSetup<'a> {
    pub key: &'a PeerKey,
    pub role: PeerRole,
    pub ice_servers: &'a [IceServerConfig],
}

pub enum PeerEvent<S> {
    NegotiationNeeded,
    IceCandidate(IceCandidate),
    GatheringComplete,
    TrackReceived(S),
    LinkState(PeerLinkState),
}

impl<S> fmt::Debug for PeerEvent<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegotiationNeeded => f.write_str("NegotiationNeeded"),
            Self::IceCandidate(c) => f.debug_tuple("IceCandidate").field(c).finish(),
            Self::GatheringComplete => f.write_str("GatheringComplete"),
            Self::TrackReceived(_) => f.write_str("TrackReceived"),
            Self::LinkState(s) => f.debug_tuple("LinkState").field(s).finish(),
        }
    }
}

#[derive(Debug)]
pub struct PeerEnvelope<S> {
    pub key: PeerKey,
    pub event: PeerEvent<S>,
}

/// Sending half of the peer event queue, owned by the client.
pub struct PeerEventSender<S> {
    tx: mpsc::UnboundedSender<PeerEnvelope<S>>,
}

impl<S> Clone for PeerEventSender<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> PeerEventSender<S> {
    pub fn bind(&self, key: PeerKey) -> PeerEventSink<S> {
        PeerEventSink {
            key,
            tx: self.tx.clone(),
        }
    }
}

/// Event sink handed to a platform peer; every event is tagged with its key.
pub struct PeerEventSink<S> {
    key: PeerKey,
    tx: mpsc::UnboundedSender<PeerEnvelope<S>>,
}

impl<S> Clone for PeerEventSink<S> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<S> PeerEventSink<S> {
    pub fn key(&self) -> &PeerKey {
        &self.key
    }

    /// Returns false once the session is gone.
    pub fn emit(&self, event: PeerEvent<S>) -> bool {
        self.tx
            .unbounded_send(PeerEnvelope {
                key: self.key.clone(),
                event,
            })
            .is_ok()
    }
}

pub fn peer_event_channel<S>() -> (PeerEventSender<S>, mpsc::UnboundedReceiver<PeerEnvelope<S>>) {
    let (tx, rx) = mpsc::unbounded();
    (PeerEventSender { tx }, rx)
}
