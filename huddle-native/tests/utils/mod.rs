
pub use native_party::*;
