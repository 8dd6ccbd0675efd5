use crate::model::ParticipantId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Capture permission was denied or no device is available.
    #[error("media access failed: {0}")]
    MediaAccess(String),

    #[error("negotiation with {participant} failed: {reason}")]
    Negotiation {
        participant: ParticipantId,
        reason: String,
    },

    #[error("unknown participant {0}")]
    UnknownParticipant(ParticipantId),

    #[error("local media is not available; join the call first")]
    NoLocalMedia,

    #[error("too many early ICE candidates buffered for {0}")]
    CandidateOverflow(ParticipantId),

    #[error("relay push `{event}` failed: {reason}")]
    Relay { event: &'static str, reason: String },

    #[error("video surface unavailable: {0}")]
    Surface(String),

    #[error("malformed {hook} trigger: {reason}")]
    MalformedTrigger { hook: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("call session is closed")]
    SessionClosed,
}

impl CallError {
    pub fn negotiation(participant: &ParticipantId, reason: impl Into<String>) -> Self {
        Self::Negotiation {
            participant: participant.clone(),
            reason: reason.into(),
        }
    }
}
