use huddle_core::{
    CallError, IceCandidate, IceServerConfig, PeerEvent, PeerEventSink, PeerLinkState, PeerRole,
    PeerSetup,
};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::engine::peer::{BrowserPeer, PeerCallbacks};
use crate::js_reason;

fn rtc_ice_server(server: &IceServerConfig) -> web_sys::RtcIceServer {
    let ice_server = web_sys::RtcIceServer::new();
    let urls: js_sys::Array = server.urls.iter().map(|url| JsValue::from_str(url)).collect();
    ice_server.set_urls(&urls);
    if let Some(username) = &server.username {
        ice_server.set_username(username);
    }
    if let Some(credential) = &server.credential {
        ice_server.set_credential(credential);
    }
    ice_server
}

fn rtc_configuration(setup: &PeerSetup<'_>) -> web_sys::RtcConfiguration {
    let servers: js_sys::Array = setup.ice_servers.iter().map(rtc_ice_server).collect();
    let rtc_config = web_sys::RtcConfiguration::new();
    rtc_config.set_ice_servers(&servers);
    rtc_config
}

fn link_state(state: web_sys::RtcPeerConnectionState) -> PeerLinkState {
    use web_sys::RtcPeerConnectionState as S;
    match state {
        S::Connecting => PeerLinkState::Connecting,
        S::Connected => PeerLinkState::Connected,
        S::Disconnected => PeerLinkState::Disconnected,
        S::Failed => PeerLinkState::Failed,
        S::Closed => PeerLinkState::Closed,
        _ => PeerLinkState::New,
    }
}

pub(super) fn create_pc(
    setup: &PeerSetup<'_>,
    events: PeerEventSink<web_sys::MediaStream>,
) -> Result<BrowserPeer, CallError> {
    let rtc_config = rtc_configuration(setup);
    let pc = web_sys::RtcPeerConnection::new_with_configuration(&rtc_config)
        .map_err(|e| CallError::negotiation(&setup.key.participant, js_reason(&e)))?;

    let sink = events.clone();
    let onice = Closure::wrap(Box::new(move |ev: web_sys::RtcPeerConnectionIceEvent| {
        match ev.candidate() {
            Some(candidate) => {
                sink.emit(PeerEvent::IceCandidate(IceCandidate {
                    candidate: candidate.candidate(),
                    sdp_mid: candidate.sdp_mid(),
                    sdp_m_line_index: candidate.sdp_m_line_index(),
                    username_fragment: None,
                }));
            }
            None => {
                sink.emit(PeerEvent::GatheringComplete);
            }
        }
    }) as Box<dyn FnMut(web_sys::RtcPeerConnectionIceEvent)>);
    pc.set_onicecandidate(Some(onice.as_ref().unchecked_ref()));

    // Only offering connections react to negotiation-needed.
    let negotiation = match setup.role {
        PeerRole::Offerer => {
            let sink = events.clone();
            let callback = Closure::wrap(Box::new(move |_ev: web_sys::Event| {
                sink.emit(PeerEvent::NegotiationNeeded);
            }) as Box<dyn FnMut(web_sys::Event)>);
            pc.set_onnegotiationneeded(Some(callback.as_ref().unchecked_ref()));
            Some(callback)
        }
        PeerRole::Answerer => None,
    };

    let sink = events.clone();
    let ontrack = Closure::wrap(Box::new(move |ev: web_sys::RtcTrackEvent| {
        let stream = ev
            .streams()
            .get(0)
            .dyn_into::<web_sys::MediaStream>()
            .ok()
            .or_else(|| {
                let stream = web_sys::MediaStream::new().ok()?;
                stream.add_track(&ev.track());
                Some(stream)
            });
        match stream {
            Some(stream) => {
                debug!("Track received from {}", sink.key());
                sink.emit(PeerEvent::TrackReceived(stream));
            }
            None => warn!("Track from {} carried no usable stream", sink.key()),
        }
    }) as Box<dyn FnMut(web_sys::RtcTrackEvent)>);
    pc.set_ontrack(Some(ontrack.as_ref().unchecked_ref()));

    let sink = events;
    let pc_for_state = pc.clone();
    let onstate = Closure::wrap(Box::new(move |_ev: web_sys::Event| {
        sink.emit(PeerEvent::LinkState(link_state(pc_for_state.connection_state())));
    }) as Box<dyn FnMut(web_sys::Event)>);
    pc.set_onconnectionstatechange(Some(onstate.as_ref().unchecked_ref()));

    let callbacks = PeerCallbacks {
        pc: pc.clone(),
        _ice: onice,
        _negotiation: negotiation,
        _track: ontrack,
        _state: onstate,
    };
    Ok(BrowserPeer::new(setup.key.clone(), pc, callbacks))
}
