use crate::model::participant::ParticipantId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
    Pranswer,
    Rollback,
}

/// Session description in the `RTCSessionDescriptionInit` shape: `{type, sdp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// ICE candidate in the `RTCIceCandidateInit` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SignalPayload {
    Offer(SessionDescription),
    Answer(SessionDescription),
    IceCandidate(IceCandidate),
}

/// A signaling message travelling through the relay boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalMessage {
    pub from: Option<ParticipantId>,
    pub to: ParticipantId,
    pub payload: SignalPayload,
}

/// Payload of one relay push, serialized exactly as the server expects it.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WirePayload<'a> {
    #[serde(rename_all = "camelCase")]
    Description {
        to_user: &'a ParticipantId,
        description: &'a SessionDescription,
    },
    #[serde(rename_all = "camelCase")]
    Candidate {
        to_user: &'a ParticipantId,
        candidate: &'a IceCandidate,
    },
}

impl SignalMessage {
    pub const OFFER_EVENT: &'static str = "new_sdp_offer";
    pub const ANSWER_EVENT: &'static str = "new_answer";
    pub const ICE_CANDIDATE_EVENT: &'static str = "new_ice_candidate";

    pub fn new(from: Option<ParticipantId>, to: ParticipantId, payload: SignalPayload) -> Self {
        Self { from, to, payload }
    }

    pub fn event_name(&self) -> &'static str {
        match self.payload {
            SignalPayload::Offer(_) => Self::OFFER_EVENT,
            SignalPayload::Answer(_) => Self::ANSWER_EVENT,
            SignalPayload::IceCandidate(_) => Self::ICE_CANDIDATE_EVENT,
        }
    }

    pub fn wire_payload(&self) -> WirePayload<'_> {
        match &self.payload {
            SignalPayload::Offer(description) | SignalPayload::Answer(description) => {
                WirePayload::Description {
                    to_user: &self.to,
                    description,
                }
            }
            SignalPayload::IceCandidate(candidate) => WirePayload::Candidate {
                to_user: &self.to,
                candidate,
            },
        }
    }
}
