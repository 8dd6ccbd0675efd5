use crate::error::CallError;
use crate::model::SignalMessage;
use async_trait::async_trait;

/// Outbound half of the relay boundary. The server side routes each message
/// to `message.to`.
#[async_trait(?Send)]
pub trait SignalRelay: 'static {
    async fn push(&self, message: &SignalMessage) -> Result<(), CallError>;
}
