pub mod media;
pub mod platform;
pub mod transport;

pub use media::{HeadlessSurfaces, NativeLocalStream, RemoteSurface};
pub use platform::NativePlatform;
pub use transport::{NativeConfig, NativePeer};
