use std::time::Duration;

use huddle_core::{LoopbackHub, NegotiationState, PeerRole};
use huddle_native::NativeConfig;
use tokio::task::LocalSet;

use crate::utils::{NativeParty, eventually, init_tracing};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::test]
async fn test_two_native_parties_connect() -> anyhow::Result<()> {
    init_tracing();

    LocalSet::new()
        .run_until(async {
            let hub = LoopbackHub::new();
            let alice = NativeParty::spawn(&hub, "alice", NativeConfig::default())?;
            let bob = NativeParty::spawn(&hub, "bob", NativeConfig::default())?;
            hub.join(alice.id.clone(), alice.handle.clone())?;
            hub.join(bob.id.clone(), bob.handle.clone())?;

            assert!(eventually(CONNECT_TIMEOUT, || alice.connected()).await);
            assert!(eventually(CONNECT_TIMEOUT, || bob.connected()).await);

            let view = alice.handle.snapshot().await?;
            let entry = view.participant(&bob.id).expect("bob is registered");
            assert_eq!(entry.role, Some(PeerRole::Offerer));
            assert_eq!(entry.state, Some(NegotiationState::Connected));
            assert!(alice.surfaces.has_local_preview());

            alice.handle.shutdown();
            bob.handle.shutdown();
            Ok::<(), anyhow::Error>(())
        })
        .await
}

#[tokio::test]
async fn test_pumped_media_reaches_remote_surface() -> anyhow::Result<()> {
    init_tracing();

    let native = NativeConfig {
        pump_samples: true,
        ..Default::default()
    };

    LocalSet::new()
        .run_until(async {
            let hub = LoopbackHub::new();
            let alice = NativeParty::spawn(&hub, "alice", native.clone())?;
            let bob = NativeParty::spawn(&hub, "bob", native)?;
            hub.join(alice.id.clone(), alice.handle.clone())?;
            hub.join(bob.id.clone(), bob.handle.clone())?;

            assert!(eventually(CONNECT_TIMEOUT, || bob.connected()).await);
            let received = eventually(CONNECT_TIMEOUT, || {
                let shown = bob.surfaces.remote(&alice.id);
                async move { !shown.is_empty() }
            })
            .await;
            assert!(received);

            let shown = bob.surfaces.remote(&alice.id);
            assert!(shown.iter().all(|s| s.kind == "audio" || s.kind == "video"));

            alice.handle.shutdown();
            bob.handle.shutdown();
            Ok::<(), anyhow::Error>(())
        })
        .await
}
