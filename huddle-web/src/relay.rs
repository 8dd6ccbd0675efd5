use async_trait::async_trait;
use huddle_core::{CallError, SignalMessage, SignalRelay};
use serde::Serialize;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};

use crate::js_reason;

/// Pushes signaling messages to the server through a LiveView hook's
/// `pushEvent(event, payload)`.
pub struct HookRelay {
    hook: JsValue,
}

impl HookRelay {
    pub fn new(hook: JsValue) -> Self {
        Self { hook }
    }

    fn push_event(&self) -> Result<js_sys::Function, JsValue> {
        js_sys::Reflect::get(&self.hook, &"pushEvent".into())?
            .dyn_into::<js_sys::Function>()
            .map_err(|_| JsValue::from_str("hook has no pushEvent function"))
    }
}

#[async_trait(?Send)]
impl SignalRelay for HookRelay {
    async fn push(&self, message: &SignalMessage) -> Result<(), CallError> {
        let event = message.event_name();
        let relay_err = |e: JsValue| CallError::Relay {
            event,
            reason: js_reason(&e),
        };

        let payload = message
            .wire_payload()
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| relay_err(e.into()))?;
        let push_event = self.push_event().map_err(relay_err)?;

        debug!("pushEvent {} to {}", event, message.to);
        push_event
            .call2(&self.hook, &JsValue::from_str(event), &payload)
            .map_err(relay_err)?;
        Ok(())
    }
}
