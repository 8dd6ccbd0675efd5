use async_trait::async_trait;
use huddle_core::{CallError, IceCandidate, PeerConnection, PeerKey, SdpKind, SessionDescription};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::engine::BrowserTrack;
use crate::js_reason;

/// Event handlers installed on the connection. Dropping the holder detaches
/// every handler from the connection before the closures are freed, so an
/// unclosed connection never calls into a dropped closure.
pub(crate) struct PeerCallbacks {
    pub(crate) pc: web_sys::RtcPeerConnection,
    pub(crate) _ice: Closure<dyn FnMut(web_sys::RtcPeerConnectionIceEvent)>,
    pub(crate) _negotiation: Option<Closure<dyn FnMut(web_sys::Event)>>,
    pub(crate) _track: Closure<dyn FnMut(web_sys::RtcTrackEvent)>,
    pub(crate) _state: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for PeerCallbacks {
    fn drop(&mut self) {
        self.pc.set_onicecandidate(None);
        self.pc.set_onnegotiationneeded(None);
        self.pc.set_ontrack(None);
        self.pc.set_onconnectionstatechange(None);
    }
}

#[derive(Clone)]
pub struct BrowserPeer {
    key: PeerKey,
    pc: web_sys::RtcPeerConnection,
    callbacks: Rc<RefCell<Option<PeerCallbacks>>>,
}

fn sdp_type(kind: SdpKind) -> web_sys::RtcSdpType {
    match kind {
        SdpKind::Offer => web_sys::RtcSdpType::Offer,
        SdpKind::Answer => web_sys::RtcSdpType::Answer,
        SdpKind::Pranswer => web_sys::RtcSdpType::Pranswer,
        SdpKind::Rollback => web_sys::RtcSdpType::Rollback,
    }
}

impl BrowserPeer {
    pub(crate) fn new(key: PeerKey, pc: web_sys::RtcPeerConnection, callbacks: PeerCallbacks) -> Self {
        Self {
            key,
            pc,
            callbacks: Rc::new(RefCell::new(Some(callbacks))),
        }
    }

    pub fn connection(&self) -> &web_sys::RtcPeerConnection {
        &self.pc
    }

    fn fail(&self, err: JsValue) -> CallError {
        CallError::negotiation(&self.key.participant, js_reason(&err))
    }

    fn init(desc: &SessionDescription) -> web_sys::RtcSessionDescriptionInit {
        let init = web_sys::RtcSessionDescriptionInit::new(sdp_type(desc.kind));
        init.set_sdp(&desc.sdp);
        init
    }

    fn read_sdp(&self, value: &JsValue, kind: SdpKind) -> Result<SessionDescription, CallError> {
        let sdp = js_sys::Reflect::get(value, &"sdp".into())
            .map_err(|e| self.fail(e))?
            .as_string()
            .ok_or_else(|| CallError::negotiation(&self.key.participant, "description without sdp"))?;
        Ok(SessionDescription { kind, sdp })
    }
}

#[async_trait(?Send)]
impl PeerConnection for BrowserPeer {
    type Track = BrowserTrack;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), CallError> {
        JsFuture::from(self.pc.set_remote_description(&Self::init(&desc)))
            .await
            .map_err(|e| self.fail(e))?;
        debug!("Remote description set ({:?}) on {}", desc.kind, self.key);
        Ok(())
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), CallError> {
        JsFuture::from(self.pc.set_local_description(&Self::init(&desc)))
            .await
            .map_err(|e| self.fail(e))?;
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, CallError> {
        let offer = JsFuture::from(self.pc.create_offer())
            .await
            .map_err(|e| self.fail(e))?;
        self.read_sdp(&offer, SdpKind::Offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription, CallError> {
        let answer = JsFuture::from(self.pc.create_answer())
            .await
            .map_err(|e| self.fail(e))?;
        self.read_sdp(&answer, SdpKind::Answer)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), CallError> {
        let init = web_sys::RtcIceCandidateInit::new(&candidate.candidate);
        if let Some(mid) = &candidate.sdp_mid {
            init.set_sdp_mid(Some(mid));
        }
        if let Some(idx) = candidate.sdp_m_line_index {
            init.set_sdp_m_line_index(Some(idx));
        }
        if let Some(ufrag) = &candidate.username_fragment {
            // web-sys exposes no setter for this dictionary member.
            let _ = js_sys::Reflect::set(&init, &"usernameFragment".into(), &JsValue::from_str(ufrag));
        }

        let promise = self
            .pc
            .add_ice_candidate_with_opt_rtc_ice_candidate_init(Some(&init));
        JsFuture::from(promise).await.map_err(|e| self.fail(e))?;
        Ok(())
    }

    async fn add_track(&self, track: &BrowserTrack) -> Result<(), CallError> {
        self.pc.add_track_0(&track.track, &track.stream);
        Ok(())
    }

    async fn close(&self) -> Result<(), CallError> {
        self.callbacks.borrow_mut().take();
        self.pc.close();
        debug!("Closed RTCPeerConnection {}", self.key);
        Ok(())
    }
}
