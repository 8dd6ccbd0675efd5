use crate::client::peer_state::NegotiationState;
use crate::model::{IceCandidate, ParticipantId};
use crate::traits::{PeerKey, PeerRole};
use std::collections::{HashMap, VecDeque};

/// The live peer connection of one participant.
pub struct ActivePeer<P> {
    pub key: PeerKey,
    pub peer: P,
    pub role: PeerRole,
    pub state: NegotiationState,
    pub remote_description_set: bool,
    /// A local offer went out and its answer has not been applied yet.
    pub offer_outstanding: bool,
}

impl<P> ActivePeer<P> {
    pub fn new(key: PeerKey, peer: P, role: PeerRole) -> Self {
        Self {
            key,
            peer,
            role,
            state: NegotiationState::New,
            remote_description_set: false,
            offer_outstanding: false,
        }
    }
}

pub struct ParticipantConnection<P> {
    peer: Option<ActivePeer<P>>,
    pending_candidates: VecDeque<IceCandidate>,
}

impl<P> ParticipantConnection<P> {
    fn empty() -> Self {
        Self {
            peer: None,
            pending_candidates: VecDeque::new(),
        }
    }

    pub fn peer(&self) -> Option<&ActivePeer<P>> {
        self.peer.as_ref()
    }

    pub fn peer_mut(&mut self) -> Option<&mut ActivePeer<P>> {
        self.peer.as_mut()
    }

    /// Installs `peer`, handing back the connection it replaces. Candidates
    /// buffered for a replaced connection are discarded with it; candidates
    /// buffered before any connection existed carry over.
    pub fn install(&mut self, peer: ActivePeer<P>) -> Option<ActivePeer<P>> {
        let previous = self.peer.replace(peer);
        if previous.is_some() {
            self.pending_candidates.clear();
        }
        previous
    }

    pub fn take_peer(&mut self) -> Option<ActivePeer<P>> {
        self.peer.take()
    }

    pub fn pending_len(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn buffer_candidate(&mut self, candidate: IceCandidate) {
        self.pending_candidates.push_back(candidate);
    }

    pub fn drain_pending(&mut self) -> Vec<IceCandidate> {
        self.pending_candidates.drain(..).collect()
    }
}

/// Participant id to connection slot. Every lookup is an `Option`.
pub struct ParticipantRegistry<P> {
    entries: HashMap<ParticipantId, ParticipantConnection<P>>,
    next_generation: u64,
}

impl<P> Default for ParticipantRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ParticipantRegistry<P> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Returns true when a new slot was created.
    pub fn insert_if_absent(&mut self, id: &ParticipantId) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries
            .insert(id.clone(), ParticipantConnection::empty());
        true
    }

    pub fn remove(&mut self, id: &ParticipantId) -> Option<ParticipantConnection<P>> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&ParticipantConnection<P>> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &ParticipantId) -> Option<&mut ParticipantConnection<P>> {
        self.entries.get_mut(id)
    }

    /// Looks up the peer for `key`, ignoring connections of other generations.
    pub fn active_mut(&mut self, key: &PeerKey) -> Option<&mut ActivePeer<P>> {
        self.entries
            .get_mut(&key.participant)?
            .peer_mut()
            .filter(|active| active.key.generation == key.generation)
    }

    pub fn next_key(&mut self, id: &ParticipantId) -> PeerKey {
        self.next_generation += 1;
        PeerKey {
            participant: id.clone(),
            generation: self.next_generation,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &ParticipantConnection<P>)> {
        self.entries.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (ParticipantId, ParticipantConnection<P>)> + '_ {
        self.entries.drain()
    }
}
