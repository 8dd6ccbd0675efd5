pub use huddle_core::{
    CallConfig, CallError, CallSession, CallSignalingClient, HookKind, LoopbackHub,
    ParticipantId, SessionCommand, SessionHandle,
};

pub mod model {
    pub use huddle_core::model::*;
}

pub mod traits {
    pub use huddle_core::traits::*;
}

#[cfg(feature = "native")]
pub mod native {
    pub use huddle_native::*;
}

#[cfg(feature = "web")]
pub mod web {
    pub use huddle_web::*;
}
