use crate::error::CallError;
use crate::model::{IceCandidate, ParticipantId};
use crate::session::command::SessionCommand;
use std::collections::HashMap;

/// Page elements whose lifecycle drives the call. The server renders one
/// element per signal with the payload in its `data-*` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    JoinCall,
    InitUser,
    HandleOfferRequest,
    HandleIceCandidateOffer,
    HandleSdpOffer,
    HandleAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookLifecycle {
    Mounted,
    Updated,
    Destroyed,
}

const USER_UUID: &str = "userUuid";
const FROM_USER_UUID: &str = "fromUserUuid";
const ICE_CANDIDATE: &str = "iceCandidate";
const SDP: &str = "sdp";

impl HookKind {
    pub const ALL: [HookKind; 6] = [
        Self::JoinCall,
        Self::InitUser,
        Self::HandleOfferRequest,
        Self::HandleIceCandidateOffer,
        Self::HandleSdpOffer,
        Self::HandleAnswer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::JoinCall => "JoinCall",
            Self::InitUser => "InitUser",
            Self::HandleOfferRequest => "HandleOfferRequest",
            Self::HandleIceCandidateOffer => "HandleIceCandidateOffer",
            Self::HandleSdpOffer => "HandleSdpOffer",
            Self::HandleAnswer => "HandleAnswer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Maps one lifecycle callback of this hook to the command it stands for.
    /// Lifecycles a hook does not react to yield `Ok(None)`.
    pub fn parse(
        self,
        lifecycle: HookLifecycle,
        dataset: &HashMap<String, String>,
    ) -> Result<Option<SessionCommand>, CallError> {
        use HookLifecycle::*;

        let command = match (self, lifecycle) {
            (Self::JoinCall, Mounted) => SessionCommand::JoinCall,
            (Self::InitUser, Mounted) => {
                SessionCommand::ParticipantJoined(self.participant(dataset, USER_UUID)?)
            }
            (Self::InitUser, Destroyed) => {
                SessionCommand::ParticipantLeft(self.participant(dataset, USER_UUID)?)
            }
            (Self::HandleOfferRequest, Mounted | Updated) => SessionCommand::OfferRequest {
                from: self.participant(dataset, FROM_USER_UUID)?,
            },
            (Self::HandleIceCandidateOffer, Mounted | Updated) => {
                let raw = self.attribute(dataset, ICE_CANDIDATE)?;
                let candidate = serde_json::from_str::<Option<IceCandidate>>(raw).map_err(|e| {
                    CallError::MalformedTrigger {
                        hook: self.name(),
                        reason: format!("invalid ICE candidate JSON: {e}"),
                    }
                })?;
                SessionCommand::IceCandidate {
                    from: self.participant(dataset, FROM_USER_UUID)?,
                    candidate,
                }
            }
            (Self::HandleSdpOffer, Mounted | Updated) => SessionCommand::SdpOffer {
                from: self.participant(dataset, FROM_USER_UUID)?,
                sdp: self.attribute(dataset, SDP)?.to_owned(),
            },
            (Self::HandleAnswer, Mounted | Updated) => SessionCommand::SdpAnswer {
                from: self.participant(dataset, FROM_USER_UUID)?,
                sdp: self.attribute(dataset, SDP)?.to_owned(),
            },
            _ => return Ok(None),
        };
        Ok(Some(command))
    }

    fn attribute<'a>(
        self,
        dataset: &'a HashMap<String, String>,
        key: &str,
    ) -> Result<&'a str, CallError> {
        dataset
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CallError::MalformedTrigger {
                hook: self.name(),
                reason: format!("missing data attribute `{key}`"),
            })
    }

    fn participant(
        self,
        dataset: &HashMap<String, String>,
        key: &str,
    ) -> Result<ParticipantId, CallError> {
        let id = self.attribute(dataset, key)?.trim();
        if id.is_empty() {
            return Err(CallError::MalformedTrigger {
                hook: self.name(),
                reason: format!("empty data attribute `{key}`"),
            });
        }
        Ok(ParticipantId::from(id))
    }
}
