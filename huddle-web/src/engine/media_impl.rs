use huddle_core::{CallError, MediaConstraints};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::js_reason;

fn video_constraint(constraints: &MediaConstraints) -> Result<JsValue, CallError> {
    match (constraints.video, constraints.ideal_width) {
        (true, Some(width)) => {
            let ideal = js_sys::Object::new();
            js_sys::Reflect::set(&ideal, &"ideal".into(), &JsValue::from(width))
                .map_err(|e| CallError::MediaAccess(js_reason(&e)))?;
            let video = js_sys::Object::new();
            js_sys::Reflect::set(&video, &"width".into(), &ideal)
                .map_err(|e| CallError::MediaAccess(js_reason(&e)))?;
            Ok(video.into())
        }
        (enabled, _) => Ok(JsValue::from_bool(enabled)),
    }
}

pub(super) async fn get_user_media(
    window: &web_sys::Window,
    constraints: &MediaConstraints,
) -> Result<web_sys::MediaStream, CallError> {
    let media_err = |e: JsValue| CallError::MediaAccess(js_reason(&e));

    let devices = window.navigator().media_devices().map_err(media_err)?;
    let request = web_sys::MediaStreamConstraints::new();
    request.set_audio(&JsValue::from_bool(constraints.audio));
    request.set_video(&video_constraint(constraints)?);

    let promise = devices
        .get_user_media_with_constraints(&request)
        .map_err(media_err)?;
    let stream = JsFuture::from(promise).await.map_err(media_err)?;
    stream
        .dyn_into::<web_sys::MediaStream>()
        .map_err(|_| CallError::MediaAccess("getUserMedia did not resolve to a MediaStream".into()))
}

pub(super) fn video_element(
    document: &web_sys::Document,
    id: &str,
) -> Result<web_sys::HtmlVideoElement, CallError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| CallError::Surface(format!("no element `#{id}`")))?
        .dyn_into::<web_sys::HtmlVideoElement>()
        .map_err(|_| CallError::Surface(format!("`#{id}` is not a <video> element")))
}
