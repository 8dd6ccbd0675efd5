use crate::error::CallError;
use crate::model::{MediaConstraints, ParticipantId};
use crate::traits::peer::{PeerConnection, PeerEventSink, PeerSetup};
use async_trait::async_trait;

pub trait LocalStream {
    type Track;

    fn tracks(&self) -> Vec<Self::Track>;
}

/// Media capture, video surfaces and peer-connection construction of one
/// runtime (browser, native).
#[async_trait(?Send)]
pub trait CallPlatform: 'static {
    type Track: Clone + 'static;
    type LocalStream: LocalStream<Track = Self::Track> + 'static;
    type RemoteStream: 'static;
    type Peer: PeerConnection<Track = Self::Track>;

    async fn acquire_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Self::LocalStream, CallError>;

    fn attach_local_preview(&self, stream: &Self::LocalStream) -> Result<(), CallError>;

    /// Builds a peer connection whose callbacks report through `events`.
    /// The negotiation-needed callback is installed only for `PeerRole::Offerer`.
    async fn create_peer(
        &self,
        setup: PeerSetup<'_>,
        events: PeerEventSink<Self::RemoteStream>,
    ) -> Result<Self::Peer, CallError>;

    fn attach_remote_stream(
        &self,
        participant: &ParticipantId,
        stream: Self::RemoteStream,
    ) -> Result<(), CallError>;

    fn detach_remote_stream(&self, _participant: &ParticipantId) {}
}
