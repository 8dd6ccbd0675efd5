use crate::model::ParticipantId;
use crate::traits::{PeerLinkState, PeerRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    Negotiating,
    Connected,
    Closed,
}

impl NegotiationState {
    /// An offer or answer exchange has started.
    pub fn begin_negotiation(self) -> Self {
        match self {
            Self::New => Self::Negotiating,
            other => other,
        }
    }

    pub fn on_link(self, link: PeerLinkState) -> Self {
        match (self, link) {
            (Self::Closed, _) => Self::Closed,
            (_, PeerLinkState::Connected) => Self::Connected,
            (_, PeerLinkState::Failed | PeerLinkState::Closed) => Self::Closed,
            // ICE may still recover a dropped link.
            (Self::Connected, PeerLinkState::Disconnected) => Self::Negotiating,
            (state, _) => state,
        }
    }

    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSnapshot {
    pub id: ParticipantId,
    pub state: Option<NegotiationState>,
    pub role: Option<PeerRole>,
    pub pending_candidates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallSnapshot {
    pub local_media: bool,
    /// Sorted by participant id.
    pub participants: Vec<ParticipantSnapshot>,
}

impl CallSnapshot {
    pub fn participant(&self, id: &ParticipantId) -> Option<&ParticipantSnapshot> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn all_connected(&self) -> bool {
        !self.participants.is_empty()
            && self
                .participants
                .iter()
                .all(|p| p.state == Some(NegotiationState::Connected))
    }
}
