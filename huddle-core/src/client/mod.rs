mod peer_state;
mod registry;

pub use peer_state::{CallSnapshot, NegotiationState, ParticipantSnapshot};
pub use registry::{ActivePeer, ParticipantConnection, ParticipantRegistry};

use crate::config::{CallConfig, EarlyCandidatePolicy};
use crate::error::CallError;
use crate::model::{
    IceCandidate, IceServerConfig, ParticipantId, SessionDescription, SignalMessage, SignalPayload,
};
use crate::session::SessionCommand;
use crate::traits::{
    CallPlatform, LocalStream, PeerConnection, PeerEnvelope, PeerEvent, PeerEventSender, PeerKey,
    PeerRole, PeerSetup, SignalRelay,
};
use tracing::{debug, error, info, warn};

/// Outcome of an inbound ICE candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateDisposition {
    Applied,
    /// Held until the remote description of the connection is set.
    Buffered,
}

/// Signaling state of one browser or native endpoint in a multi-party call:
/// the local capture stream plus one peer connection per remote participant.
pub struct CallSignalingClient<P: CallPlatform, R: SignalRelay> {
    platform: P,
    relay: R,
    config: CallConfig,
    ice_servers: Vec<IceServerConfig>,
    local_stream: Option<P::LocalStream>,
    registry: ParticipantRegistry<P::Peer>,
    events: PeerEventSender<P::RemoteStream>,
}

impl<P: CallPlatform, R: SignalRelay> CallSignalingClient<P, R> {
    pub fn new(
        platform: P,
        relay: R,
        config: CallConfig,
        events: PeerEventSender<P::RemoteStream>,
    ) -> Self {
        let ice_servers = config.resolved_ice_servers();
        Self {
            platform,
            relay,
            config,
            ice_servers,
            local_stream: None,
            registry: ParticipantRegistry::new(),
            events,
        }
    }

    pub fn config(&self) -> &CallConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn has_local_media(&self) -> bool {
        self.local_stream.is_some()
    }

    pub fn is_registered(&self, id: &ParticipantId) -> bool {
        self.registry.contains(id)
    }

    pub fn participants(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<ParticipantId> = self.registry.iter().map(|(id, _)| id.clone()).collect();
        ids.sort();
        ids
    }

    pub fn negotiation_state(&self, id: &ParticipantId) -> Option<NegotiationState> {
        self.registry.get(id)?.peer().map(|active| active.state)
    }

    pub fn snapshot(&self) -> CallSnapshot {
        let mut participants: Vec<ParticipantSnapshot> = self
            .registry
            .iter()
            .map(|(id, entry)| ParticipantSnapshot {
                id: id.clone(),
                state: entry.peer().map(|active| active.state),
                role: entry.peer().map(|active| active.role),
                pending_candidates: entry.pending_len(),
            })
            .collect();
        participants.sort_by(|a, b| a.id.cmp(&b.id));

        CallSnapshot {
            local_media: self.has_local_media(),
            participants,
        }
    }

    pub async fn apply(&mut self, command: SessionCommand) -> Result<(), CallError> {
        match command {
            SessionCommand::JoinCall => self.acquire_local_media().await,
            SessionCommand::ParticipantJoined(id) => {
                self.register_participant(&id);
                Ok(())
            }
            SessionCommand::ParticipantLeft(id) => {
                self.unregister_participant(&id).await;
                Ok(())
            }
            SessionCommand::OfferRequest { from } => self.handle_offer_request(&from).await,
            SessionCommand::SdpOffer { from, sdp } => self.handle_inbound_offer(&from, &sdp).await,
            SessionCommand::SdpAnswer { from, sdp } => {
                self.handle_inbound_answer(&from, &sdp).await
            }
            SessionCommand::IceCandidate {
                from,
                candidate: Some(candidate),
            } => self
                .handle_inbound_ice_candidate(&from, candidate)
                .await
                .map(|_| ()),
            SessionCommand::IceCandidate {
                from,
                candidate: None,
            } => {
                debug!("End of remote candidates from {}", from);
                Ok(())
            }
        }
    }

    /// Requests capture and binds it to the local preview. Joining twice keeps
    /// the first stream.
    pub async fn acquire_local_media(&mut self) -> Result<(), CallError> {
        if self.local_stream.is_some() {
            debug!("Local media already acquired");
            return Ok(());
        }

        info!("Requesting local media: {:?}", self.config.media);
        let stream = match self.platform.acquire_media(&self.config.media).await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Local media unavailable: {}", e);
                return Err(e);
            }
        };

        if let Err(e) = self.platform.attach_local_preview(&stream) {
            warn!("Local preview not attached: {}", e);
        }

        info!("Local media ready with {} tracks", stream.tracks().len());
        self.local_stream = Some(stream);
        Ok(())
    }

    pub fn register_participant(&mut self, id: &ParticipantId) -> bool {
        let inserted = self.registry.insert_if_absent(id);
        if inserted {
            info!("Participant {} joined", id);
        } else {
            debug!("Participant {} already registered", id);
        }
        inserted
    }

    pub async fn unregister_participant(&mut self, id: &ParticipantId) -> bool {
        let Some(mut entry) = self.registry.remove(id) else {
            debug!("Participant {} was not registered", id);
            return false;
        };
        info!("Participant {} left", id);

        let Some(active) = entry.take_peer() else {
            return true;
        };
        if !self.config.close_on_unregister {
            debug!("Releasing peer {} without closing it", active.key);
            return true;
        }

        if let Err(e) = active.peer.close().await {
            warn!("Failed to close peer {}: {}", active.key, e);
        }
        self.platform.detach_remote_stream(id);
        true
    }

    /// Builds the peer connection for `id`. With `remote_offer` this side
    /// answers, otherwise it offers once the platform asks for negotiation.
    pub async fn create_peer_connection(
        &mut self,
        id: &ParticipantId,
        remote_offer: Option<&str>,
    ) -> Result<P::Peer, CallError> {
        if !self.registry.contains(id) {
            return Err(CallError::UnknownParticipant(id.clone()));
        }
        let tracks = match &self.local_stream {
            Some(stream) => stream.tracks(),
            None => return Err(CallError::NoLocalMedia),
        };

        let role = match remote_offer {
            Some(_) => PeerRole::Answerer,
            None => PeerRole::Offerer,
        };
        let key = self.registry.next_key(id);
        let setup = PeerSetup {
            key: &key,
            role,
            ice_servers: &self.ice_servers,
        };
        let peer = self
            .platform
            .create_peer(setup, self.events.bind(key.clone()))
            .await?;
        info!("Created {:?} peer {}", role, key);

        let previous = self
            .registry
            .get_mut(id)
            .ok_or_else(|| CallError::UnknownParticipant(id.clone()))?
            .install(ActivePeer::new(key.clone(), peer.clone(), role));
        if let Some(previous) = previous {
            info!("Peer {} replaced by {}", previous.key, key);
            if let Err(e) = previous.peer.close().await {
                warn!("Failed to close replaced peer {}: {}", previous.key, e);
            }
        }

        for track in &tracks {
            peer.add_track(track).await?;
        }

        if let Some(offer) = remote_offer {
            self.answer_offer(&key, &peer, offer).await?;
        }

        Ok(peer)
    }

    pub async fn handle_offer_request(&mut self, from: &ParticipantId) -> Result<(), CallError> {
        info!("Offer requested by {}", from);
        self.create_peer_connection(from, None).await.map(|_| ())
    }

    pub async fn handle_inbound_offer(
        &mut self,
        from: &ParticipantId,
        sdp: &str,
    ) -> Result<(), CallError> {
        if sdp.trim().is_empty() {
            debug!("Skipping empty offer from {}", from);
            return Ok(());
        }
        info!("Received OFFER from {}", from);
        self.create_peer_connection(from, Some(sdp)).await.map(|_| ())
    }

    pub async fn handle_inbound_answer(
        &mut self,
        from: &ParticipantId,
        sdp: &str,
    ) -> Result<(), CallError> {
        if sdp.trim().is_empty() {
            debug!("Skipping empty answer from {}", from);
            return Ok(());
        }

        let active = self
            .registry
            .get_mut(from)
            .and_then(|entry| entry.peer_mut())
            .ok_or_else(|| CallError::UnknownParticipant(from.clone()))?;
        if active.role == PeerRole::Answerer {
            warn!("Answer from {} for a connection this side did not offer", from);
            return Err(CallError::negotiation(
                from,
                "answer for a connection this side did not offer",
            ));
        }
        active.offer_outstanding = false;
        let key = active.key.clone();
        let peer = active.peer.clone();

        info!("Received ANSWER from {}", from);
        peer.set_remote_description(SessionDescription::answer(sdp))
            .await?;
        self.flush_pending(&key, &peer).await;
        Ok(())
    }

    pub async fn handle_inbound_ice_candidate(
        &mut self,
        from: &ParticipantId,
        candidate: IceCandidate,
    ) -> Result<CandidateDisposition, CallError> {
        let policy = self.config.early_candidates;
        let limit = self.config.max_pending_candidates;
        let entry = self
            .registry
            .get_mut(from)
            .ok_or_else(|| CallError::UnknownParticipant(from.clone()))?;

        let ready_peer = match entry.peer() {
            Some(active) if active.remote_description_set => Some(active.peer.clone()),
            Some(active) if policy == EarlyCandidatePolicy::Reject => Some(active.peer.clone()),
            Some(_) => None,
            None if policy == EarlyCandidatePolicy::Reject => {
                return Err(CallError::UnknownParticipant(from.clone()));
            }
            None => None,
        };

        match ready_peer {
            Some(peer) => {
                debug!("Adding ICE candidate from {}: {}", from, candidate.candidate);
                peer.add_ice_candidate(candidate).await?;
                Ok(CandidateDisposition::Applied)
            }
            None if entry.pending_len() >= limit => {
                warn!("Dropping early ICE candidate from {}: buffer full", from);
                Err(CallError::CandidateOverflow(from.clone()))
            }
            None => {
                debug!("Buffering early ICE candidate from {}", from);
                entry.buffer_candidate(candidate);
                Ok(CandidateDisposition::Buffered)
            }
        }
    }

    pub async fn handle_peer_event(
        &mut self,
        envelope: PeerEnvelope<P::RemoteStream>,
    ) -> Result<(), CallError> {
        let PeerEnvelope { key, event } = envelope;
        let Some(active) = self.registry.active_mut(&key) else {
            debug!("Dropping {:?} from retired peer {}", event, key);
            return Ok(());
        };
        if active.state.is_closed() {
            debug!("Dropping {:?} from closed peer {}", event, key);
            return Ok(());
        }

        match event {
            PeerEvent::NegotiationNeeded => {
                if active.role != PeerRole::Offerer {
                    warn!("Ignoring negotiation-needed on answering peer {}", key);
                    return Ok(());
                }
                if active.offer_outstanding {
                    debug!("Offer to {} still awaiting an answer", key);
                    return Ok(());
                }
                active.state = active.state.begin_negotiation();
                active.offer_outstanding = true;
                let peer = active.peer.clone();

                let sent = self.send_offer(&key, &peer).await;
                if sent.is_err() {
                    if let Some(active) = self.registry.active_mut(&key) {
                        active.offer_outstanding = false;
                    }
                }
                sent
            }
            PeerEvent::IceCandidate(candidate) => {
                debug!("Forwarding ICE candidate to {}", key.participant);
                self.push(&key.participant, SignalPayload::IceCandidate(candidate))
                    .await
            }
            PeerEvent::GatheringComplete => {
                debug!("ICE gathering complete for {}", key);
                Ok(())
            }
            PeerEvent::TrackReceived(stream) => {
                info!("Track received from {}", key.participant);
                self.platform.attach_remote_stream(&key.participant, stream)
            }
            PeerEvent::LinkState(link) => {
                let next = active.state.on_link(link);
                if next != active.state {
                    info!("Peer {} {:?} -> {:?}", key, active.state, next);
                    active.state = next;
                }
                Ok(())
            }
        }
    }

    /// Closes every peer connection and forgets all participants.
    pub async fn close_all(&mut self) {
        let peers: Vec<_> = self
            .registry
            .drain()
            .filter_map(|(_, mut entry)| entry.take_peer())
            .collect();
        for active in peers {
            if let Err(e) = active.peer.close().await {
                warn!("Failed to close peer {}: {}", active.key, e);
            }
            self.platform.detach_remote_stream(&active.key.participant);
        }
    }

    async fn send_offer(&self, key: &PeerKey, peer: &P::Peer) -> Result<(), CallError> {
        let offer = peer.create_offer().await?;
        peer.set_local_description(offer.clone()).await?;
        info!("Sending OFFER to {}", key.participant);
        self.push(&key.participant, SignalPayload::Offer(offer))
            .await
    }

    async fn answer_offer(
        &mut self,
        key: &PeerKey,
        peer: &P::Peer,
        sdp: &str,
    ) -> Result<(), CallError> {
        if let Some(active) = self.registry.active_mut(key) {
            active.state = active.state.begin_negotiation();
        }

        peer.set_remote_description(SessionDescription::offer(sdp))
            .await?;
        self.flush_pending(key, peer).await;

        let answer = peer.create_answer().await?;
        peer.set_local_description(answer.clone()).await?;
        info!("Sending ANSWER to {}", key.participant);
        self.push(&key.participant, SignalPayload::Answer(answer))
            .await
    }

    /// Marks the remote description as set and applies buffered candidates.
    async fn flush_pending(&mut self, key: &PeerKey, peer: &P::Peer) {
        let Some(entry) = self.registry.get_mut(&key.participant) else {
            return;
        };
        match entry.peer_mut() {
            Some(active) if active.key == *key => active.remote_description_set = true,
            _ => return,
        }

        let pending = entry.drain_pending();
        if pending.is_empty() {
            return;
        }
        debug!("Applying {} buffered candidates to {}", pending.len(), key);
        for candidate in pending {
            if let Err(e) = peer.add_ice_candidate(candidate).await {
                warn!("Buffered candidate rejected by {}: {}", key, e);
            }
        }
    }

    async fn push(&self, to: &ParticipantId, payload: SignalPayload) -> Result<(), CallError> {
        let message = SignalMessage::new(self.config.local_participant.clone(), to.clone(), payload);
        self.relay.push(&message).await
    }
}
