mod engine;
mod hooks;
mod logger;
mod relay;

pub use engine::{BrowserLocalStream, BrowserPeer, BrowserPlatform, BrowserTrack, SurfaceConfig};
pub use hooks::{CallHooks, WebCallConfig};
pub use logger::{ConsoleMakeWriter, init_logging};
pub use relay::HookRelay;

use huddle_core::CallError;
use wasm_bindgen::{JsCast, JsValue};

/// Best-effort text of a rejected promise or thrown value.
pub(crate) fn js_reason(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return format!("{}: {}", String::from(err.name()), String::from(err.message()));
    }
    format!("{value:?}")
}

pub(crate) fn to_js(err: CallError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
