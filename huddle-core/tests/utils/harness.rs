use futures::FutureExt;
use futures::StreamExt;
use futures::channel::mpsc;
use tracing::Level;

use huddle_core::{
    CallConfig, CallSignalingClient, ParticipantId, PeerEnvelope, peer_event_channel,
};

use super::mock_platform::{MockPlatform, MockStream};
use super::mock_relay::CapturingRelay;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A client wired to mocks, with manual control over peer event delivery.
pub struct Harness {
    pub client: CallSignalingClient<MockPlatform, CapturingRelay>,
    pub platform: MockPlatform,
    pub relay: CapturingRelay,
    events: mpsc::UnboundedReceiver<PeerEnvelope<MockStream>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_platform(MockPlatform::new(), CallConfig::default())
    }

    pub fn with_config(config: CallConfig) -> Self {
        Self::with_platform(MockPlatform::new(), config)
    }

    pub fn with_platform(platform: MockPlatform, config: CallConfig) -> Self {
        init_tracing();
        let relay = CapturingRelay::new();
        let (events_tx, events) = peer_event_channel();
        let client = CallSignalingClient::new(platform.clone(), relay.clone(), config, events_tx);
        Self {
            client,
            platform,
            relay,
            events,
        }
    }

    /// Harness that already holds local media and knows `participants`.
    pub async fn joined(participants: &[&str]) -> Self {
        let mut harness = Self::new();
        harness
            .client
            .acquire_local_media()
            .await
            .expect("local media");
        for id in participants {
            harness.client.register_participant(&ParticipantId::from(*id));
        }
        harness
    }

    /// Delivers queued peer events until none are left. Returns how many
    /// were handled.
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(Some(envelope)) = self.events.next().now_or_never() {
            if let Err(e) = self.client.handle_peer_event(envelope).await {
                tracing::warn!("[Harness] peer event failed: {}", e);
            }
            handled += 1;
        }
        handled
    }
}
