use crate::error::CallError;
use crate::model::{IceServerConfig, MediaConstraints, ParticipantId};
use crate::utils::{
    DEFAULT_MAX_PENDING_CANDIDATES, DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, DEFAULT_STUN_ADDR_3,
    DEFAULT_STUN_ADDR_4, ICE_URL_SCHEMES,
};
use serde::{Deserialize, Serialize};

/// What to do with an ICE candidate that arrives before the remote
/// description of its peer connection is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyCandidatePolicy {
    /// Hold it and apply it once the remote description is set.
    #[default]
    Buffer,
    /// Fail with `UnknownParticipant` when no connection exists yet.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    /// Stamped as `from` on every outbound signaling message.
    pub local_participant: Option<ParticipantId>,
    /// `None` selects the built-in STUN list. An explicit list must not be empty.
    pub ice_servers: Option<Vec<IceServerConfig>>,
    pub media: MediaConstraints,
    pub early_candidates: EarlyCandidatePolicy,
    pub max_pending_candidates: usize,
    pub close_on_unregister: bool,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            local_participant: None,
            ice_servers: None,
            media: MediaConstraints::default(),
            early_candidates: EarlyCandidatePolicy::default(),
            max_pending_candidates: DEFAULT_MAX_PENDING_CANDIDATES,
            close_on_unregister: true,
        }
    }
}

impl CallConfig {
    pub fn from_json(text: &str) -> Result<Self, CallError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| CallError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CallError> {
        if let Some(servers) = &self.ice_servers {
            if servers.is_empty() {
                return Err(CallError::Config(
                    "at least one ICE server is required".into(),
                ));
            }
            for server in servers {
                if server.urls.is_empty() {
                    return Err(CallError::Config("ICE server without urls".into()));
                }
                if let Some(url) = server
                    .urls
                    .iter()
                    .find(|url| !ICE_URL_SCHEMES.iter().any(|s| url.starts_with(s)))
                {
                    return Err(CallError::Config(format!("unsupported ICE url `{url}`")));
                }
            }
        }

        if self.early_candidates == EarlyCandidatePolicy::Buffer && self.max_pending_candidates == 0
        {
            return Err(CallError::Config(
                "max_pending_candidates must be positive when buffering".into(),
            ));
        }

        Ok(())
    }

    pub fn resolved_ice_servers(&self) -> Vec<IceServerConfig> {
        match &self.ice_servers {
            Some(servers) => servers.clone(),
            None => vec![IceServerConfig {
                urls: vec![
                    DEFAULT_STUN_ADDR.to_owned(),
                    DEFAULT_STUN_ADDR_2.to_owned(),
                    DEFAULT_STUN_ADDR_3.to_owned(),
                    DEFAULT_STUN_ADDR_4.to_owned(),
                ],
                username: None,
                credential: None,
            }],
        }
    }
}
