mod peer;
mod platform;
mod relay;

pub use peer::{
    PeerConnection, PeerEnvelope, PeerEvent, PeerEventSender, PeerEventSink, PeerKey,
    PeerLinkState, PeerRole, PeerSetup, peer_event_channel,
};
pub use platform::{CallPlatform, LocalStream};
pub use relay::SignalRelay;
