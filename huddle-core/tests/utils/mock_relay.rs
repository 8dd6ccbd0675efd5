use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;

use huddle_core::{CallError, ParticipantId, SignalMessage, SignalRelay};

/// Relay that captures every outbound push for verification.
#[derive(Clone, Default)]
pub struct CapturingRelay {
    sent: Rc<RefCell<Vec<SignalMessage>>>,
}

impl CapturingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SignalMessage> {
        self.sent.borrow().clone()
    }

    /// Number of pushes of `event` addressed to `to`.
    pub fn count(&self, event: &str, to: &ParticipantId) -> usize {
        self.sent
            .borrow()
            .iter()
            .filter(|m| m.event_name() == event && &m.to == to)
            .count()
    }
}

#[async_trait(?Send)]
impl SignalRelay for CapturingRelay {
    async fn push(&self, message: &SignalMessage) -> Result<(), CallError> {
        tracing::debug!("[CapturingRelay] {} to {}", message.event_name(), message.to);
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::{SessionDescription, SignalPayload};

    #[tokio::test]
    async fn test_capturing_relay_counts_by_event() {
        let relay = CapturingRelay::new();
        let to = ParticipantId::from("u1");
        relay
            .push(&SignalMessage::new(
                None,
                to.clone(),
                SignalPayload::Offer(SessionDescription::offer("v=0")),
            ))
            .await
            .unwrap();

        assert_eq!(relay.count(SignalMessage::OFFER_EVENT, &to), 1);
        assert_eq!(relay.count(SignalMessage::ANSWER_EVENT, &to), 0);
    }
}
