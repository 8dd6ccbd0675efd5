use std::collections::HashMap;

use huddle_core::{CallConfig, CallSession, HookKind, HookLifecycle, SessionCommand, SessionHandle};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::engine::{BrowserPlatform, SurfaceConfig};
use crate::relay::HookRelay;
use crate::to_js;

/// Options accepted by [`CallHooks::new`]: the call settings plus the
/// element ids used for video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebCallConfig {
    #[serde(flatten)]
    pub call: CallConfig,
    pub surfaces: SurfaceConfig,
}

/// Entry point for the page's LiveView hooks. Each hook callback forwards
/// its element dataset here, e.g. `calls.mounted("InitUser", this.el.dataset)`.
#[wasm_bindgen]
pub struct CallHooks {
    handle: SessionHandle,
}

fn read_dataset(dataset: &JsValue) -> HashMap<String, String> {
    let Some(object) = dataset.dyn_ref::<js_sys::Object>() else {
        return HashMap::new();
    };
    js_sys::Object::entries(object)
        .iter()
        .filter_map(|entry| {
            let pair = entry.dyn_into::<js_sys::Array>().ok()?;
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect()
}

#[wasm_bindgen]
impl CallHooks {
    /// `target` is the hook object whose `pushEvent` reaches the server.
    #[wasm_bindgen(constructor)]
    pub fn new(target: JsValue, config: JsValue) -> Result<CallHooks, JsValue> {
        let config: WebCallConfig = if config.is_undefined() || config.is_null() {
            WebCallConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let platform = BrowserPlatform::new(config.surfaces).map_err(to_js)?;
        let (session, handle) =
            CallSession::new(platform, HookRelay::new(target), config.call).map_err(to_js)?;
        wasm_bindgen_futures::spawn_local(session.run());

        info!("Call hooks ready");
        Ok(CallHooks { handle })
    }

    pub fn mounted(&self, hook_name: &str, dataset: JsValue) -> Result<(), JsValue> {
        self.dispatch(hook_name, HookLifecycle::Mounted, &dataset)
    }

    pub fn updated(&self, hook_name: &str, dataset: JsValue) -> Result<(), JsValue> {
        self.dispatch(hook_name, HookLifecycle::Updated, &dataset)
    }

    pub fn destroyed(&self, hook_name: &str, dataset: JsValue) -> Result<(), JsValue> {
        self.dispatch(hook_name, HookLifecycle::Destroyed, &dataset)
    }

    #[wasm_bindgen(js_name = joinCall)]
    pub fn join_call(&self) -> Result<(), JsValue> {
        self.handle.send(SessionCommand::JoinCall).map_err(to_js)
    }

    pub fn shutdown(&self) {
        self.handle.shutdown();
    }
}

impl CallHooks {
    fn dispatch(
        &self,
        hook_name: &str,
        lifecycle: HookLifecycle,
        dataset: &JsValue,
    ) -> Result<(), JsValue> {
        let hook = HookKind::from_name(hook_name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown hook `{hook_name}`")))?;

        match hook.parse(lifecycle, &read_dataset(dataset)) {
            Ok(Some(command)) => self.handle.send(command).map_err(to_js),
            Ok(None) => Ok(()),
            Err(e) => {
                error!("{:?} on {} rejected: {}", lifecycle, hook_name, e);
                Err(to_js(e))
            }
        }
    }
}
