use crate::error::CallError;
use crate::model::{ParticipantId, SignalMessage};
use crate::session::{SessionCommand, SessionHandle};
use crate::traits::SignalRelay;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info};

/// In-process stand-in for the server relay: routes pushes between sessions
/// running on the same thread and announces joins and leaves the way the
/// call server does.
#[derive(Clone, Default)]
pub struct LoopbackHub {
    sessions: Rc<RefCell<BTreeMap<ParticipantId, SessionHandle>>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relay_for(&self, local: ParticipantId) -> LoopbackRelay {
        LoopbackRelay {
            local,
            hub: self.clone(),
        }
    }

    /// Registers `id` and introduces it to everyone present. Each existing
    /// participant is asked to offer to the newcomer.
    pub fn join(&self, id: ParticipantId, handle: SessionHandle) -> Result<(), CallError> {
        let existing: Vec<(ParticipantId, SessionHandle)> = self
            .sessions
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (other_id, other) in &existing {
            handle.send(SessionCommand::ParticipantJoined(other_id.clone()))?;
            other.send(SessionCommand::ParticipantJoined(id.clone()))?;
            other.send(SessionCommand::OfferRequest { from: id.clone() })?;
        }

        info!("Participant {} joined loopback with {} peers", id, existing.len());
        self.sessions.borrow_mut().insert(id, handle);
        Ok(())
    }

    pub fn leave(&self, id: &ParticipantId) -> Option<SessionHandle> {
        let handle = self.sessions.borrow_mut().remove(id)?;
        for other in self.sessions.borrow().values() {
            let _ = other.send(SessionCommand::ParticipantLeft(id.clone()));
        }
        info!("Participant {} left loopback", id);
        Some(handle)
    }

    pub fn participants(&self) -> Vec<ParticipantId> {
        self.sessions.borrow().keys().cloned().collect()
    }

    pub fn handle(&self, id: &ParticipantId) -> Option<SessionHandle> {
        self.sessions.borrow().get(id).cloned()
    }

    pub fn deliver(&self, to: &ParticipantId, command: SessionCommand) -> Result<(), CallError> {
        let sessions = self.sessions.borrow();
        let target = sessions
            .get(to)
            .ok_or_else(|| CallError::UnknownParticipant(to.clone()))?;
        target.send(command)
    }
}

pub struct LoopbackRelay {
    local: ParticipantId,
    hub: LoopbackHub,
}

#[async_trait(?Send)]
impl SignalRelay for LoopbackRelay {
    async fn push(&self, message: &SignalMessage) -> Result<(), CallError> {
        debug!(
            "[Loopback] {} {} -> {}",
            message.event_name(),
            self.local,
            message.to
        );
        let command = SessionCommand::from_relayed(self.local.clone(), message.clone());
        self.hub
            .deliver(&message.to, command)
            .map_err(|e| CallError::Relay {
                event: message.event_name(),
                reason: e.to_string(),
            })
    }
}
