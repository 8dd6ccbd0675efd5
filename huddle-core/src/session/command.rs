use crate::model::{IceCandidate, ParticipantId, SignalMessage, SignalPayload};

/// Inbound work for a call session, produced by hook triggers or a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Acquire local capture and bind the preview.
    JoinCall,
    ParticipantJoined(ParticipantId),
    ParticipantLeft(ParticipantId),
    /// The server asks this side to offer to `from`.
    OfferRequest { from: ParticipantId },
    SdpOffer { from: ParticipantId, sdp: String },
    SdpAnswer { from: ParticipantId, sdp: String },
    /// `None` marks the end of the remote candidate sequence.
    IceCandidate {
        from: ParticipantId,
        candidate: Option<IceCandidate>,
    },
}

impl SessionCommand {
    /// Turns a message relayed from `sender` into the command its recipient runs.
    pub fn from_relayed(sender: ParticipantId, message: SignalMessage) -> Self {
        match message.payload {
            SignalPayload::Offer(desc) => Self::SdpOffer {
                from: sender,
                sdp: desc.sdp,
            },
            SignalPayload::Answer(desc) => Self::SdpAnswer {
                from: sender,
                sdp: desc.sdp,
            },
            SignalPayload::IceCandidate(candidate) => Self::IceCandidate {
                from: sender,
                candidate: Some(candidate),
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::JoinCall => "join_call",
            Self::ParticipantJoined(_) => "participant_joined",
            Self::ParticipantLeft(_) => "participant_left",
            Self::OfferRequest { .. } => "offer_request",
            Self::SdpOffer { .. } => "sdp_offer",
            Self::SdpAnswer { .. } => "sdp_answer",
            Self::IceCandidate { .. } => "ice_candidate",
        }
    }
}
