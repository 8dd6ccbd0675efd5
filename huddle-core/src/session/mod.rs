mod command;
mod hook;
mod loopback;

pub use command::SessionCommand;
pub use hook::{HookKind, HookLifecycle};
pub use loopback::{LoopbackHub, LoopbackRelay};

use crate::client::{CallSignalingClient, CallSnapshot};
use crate::config::CallConfig;
use crate::error::CallError;
use crate::traits::{CallPlatform, PeerEnvelope, SignalRelay, peer_event_channel};
use futures::StreamExt;
use futures::channel::{mpsc, oneshot};
use tracing::{error, info, warn};

enum Control {
    Signal(SessionCommand),
    Snapshot(oneshot::Sender<CallSnapshot>),
    Shutdown,
}

/// Cloneable entry point into a running [`CallSession`].
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Control>,
}

impl SessionHandle {
    pub fn send(&self, command: SessionCommand) -> Result<(), CallError> {
        self.tx
            .unbounded_send(Control::Signal(command))
            .map_err(|_| CallError::SessionClosed)
    }

    pub async fn snapshot(&self) -> Result<CallSnapshot, CallError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .unbounded_send(Control::Snapshot(reply_tx))
            .map_err(|_| CallError::SessionClosed)?;
        reply_rx.await.map_err(|_| CallError::SessionClosed)
    }

    /// Stops the session after the commands already queued.
    pub fn shutdown(&self) {
        let _ = self.tx.unbounded_send(Control::Shutdown);
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Single event loop of one call endpoint. Inbound commands and peer events
/// are processed one at a time, so registry access never interleaves.
pub struct CallSession<P: CallPlatform, R: SignalRelay> {
    client: CallSignalingClient<P, R>,
    control_rx: mpsc::UnboundedReceiver<Control>,
    events_rx: mpsc::UnboundedReceiver<PeerEnvelope<P::RemoteStream>>,
}

impl<P: CallPlatform, R: SignalRelay> CallSession<P, R> {
    pub fn new(platform: P, relay: R, config: CallConfig) -> Result<(Self, SessionHandle), CallError> {
        config.validate()?;

        let (control_tx, control_rx) = mpsc::unbounded();
        let (events, events_rx) = peer_event_channel();
        let client = CallSignalingClient::new(platform, relay, config, events);

        let session = Self {
            client,
            control_rx,
            events_rx,
        };
        Ok((session, SessionHandle { tx: control_tx }))
    }

    pub fn client(&self) -> &CallSignalingClient<P, R> {
        &self.client
    }

    /// Runs until every handle is dropped or `shutdown` is called. Failures
    /// are logged and the loop moves on to the next event.
    pub async fn run(self) {
        let CallSession {
            mut client,
            mut control_rx,
            mut events_rx,
        } = self;
        info!("Call session started");

        loop {
            futures::select! {
                control = control_rx.next() => match control {
                    Some(Control::Signal(command)) => {
                        let label = command.label();
                        if let Err(e) = client.apply(command).await {
                            error!("{} failed: {}", label, e);
                        }
                    }
                    Some(Control::Snapshot(reply)) => {
                        let _ = reply.send(client.snapshot());
                    }
                    Some(Control::Shutdown) | None => {
                        info!("Control channel closed. Shutting down session.");
                        break;
                    }
                },

                envelope = events_rx.next() => match envelope {
                    Some(envelope) => {
                        let key = envelope.key.clone();
                        if let Err(e) = client.handle_peer_event(envelope).await {
                            error!("Peer event for {} failed: {}", key, e);
                        }
                    }
                    None => {
                        warn!("Peer event channel closed unexpectedly");
                        break;
                    }
                },
            }
        }

        client.close_all().await;
        info!("Call session finished");
    }
}
