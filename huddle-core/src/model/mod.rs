mod media;
mod participant;
mod signaling;

pub use media::MediaConstraints;
pub use participant::ParticipantId;
pub use signaling::{
    IceCandidate, IceServerConfig, SdpKind, SessionDescription, SignalMessage, SignalPayload,
    WirePayload,
};
