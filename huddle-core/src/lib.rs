pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod traits;
pub mod utils;

pub use client::{CallSignalingClient, CallSnapshot, CandidateDisposition, NegotiationState};
pub use config::{CallConfig, EarlyCandidatePolicy};
pub use error::CallError;
pub use model::*;
pub use session::{
    CallSession, HookKind, HookLifecycle, LoopbackHub, LoopbackRelay, SessionCommand,
    SessionHandle,
};
pub use traits::*;
