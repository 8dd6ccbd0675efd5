use huddle_core::ParticipantId;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// What a headless "video element" currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSurface {
    pub track_id: String,
    pub kind: String,
    pub codec: String,
}

/// Stand-in for page elements when there is no page: records which remote
/// tracks are attached to which participant.
#[derive(Clone, Default)]
pub struct HeadlessSurfaces {
    local_preview: Rc<RefCell<bool>>,
    remote: Rc<RefCell<BTreeMap<ParticipantId, Vec<RemoteSurface>>>>,
}

impl HeadlessSurfaces {
    pub fn show_local(&self) {
        *self.local_preview.borrow_mut() = true;
    }

    pub fn has_local_preview(&self) -> bool {
        *self.local_preview.borrow()
    }

    pub fn attach(&self, participant: &ParticipantId, surface: RemoteSurface) {
        let mut remote = self.remote.borrow_mut();
        let shown = remote.entry(participant.clone()).or_default();
        shown.retain(|s| s.kind != surface.kind);
        shown.push(surface);
    }

    pub fn detach(&self, participant: &ParticipantId) {
        self.remote.borrow_mut().remove(participant);
    }

    pub fn remote(&self, participant: &ParticipantId) -> Vec<RemoteSurface> {
        self.remote
            .borrow()
            .get(participant)
            .cloned()
            .unwrap_or_default()
    }

    pub fn attached_participants(&self) -> Vec<ParticipantId> {
        self.remote.borrow().keys().cloned().collect()
    }
}
