pub mod harness;
pub mod mock_relay;

pub use harness::*;
pub use mock_platform::*;
pub use mock_relay::*;
