mod native_peer;
mod transport_config;

pub use native_peer::NativePeer;
pub use transport_config::NativeConfig;
