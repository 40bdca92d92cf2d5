use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use super::messages::BridgeMessage;
use crate::host::HostDocument;

/// Identity supplied by the host document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// The host side of the message channel
///
/// Held by whoever plays the host document: tests, the demo service's
/// message endpoint, or a real embedding shim.
pub struct HostEndpoint {
    /// Messages the widget sent to the host
    pub from_widget: mpsc::Receiver<BridgeMessage>,
    /// Sender for host → widget messages
    pub to_widget: mpsc::Sender<BridgeMessage>,
}

/// Cross-document messaging layer
///
/// Passive listener for host messages plus a best-effort broadcaster.
/// When the host document is same-origin-accessible, a cooperating
/// ready-listener is injected so finalized-transcript broadcasts are
/// caught host-side even if the field resolver fails; cross-origin
/// refusal degrades silently because injection is an optimization, not a
/// correctness dependency.
pub struct HostBridge {
    doc: Arc<dyn HostDocument>,
    outbound: mpsc::Sender<BridgeMessage>,
    identity: Arc<RwLock<HostIdentity>>,
    injected: bool,
}

impl HostBridge {
    /// Wire up a bridge and the matching host endpoint
    pub fn connect(doc: Arc<dyn HostDocument>) -> (Arc<Self>, HostEndpoint) {
        let (widget_tx, host_rx) = mpsc::channel(64);
        let (host_tx, widget_rx) = mpsc::channel(64);

        let injected = if doc.same_origin() {
            match doc.install_ready_listener() {
                Ok(()) => {
                    info!("cooperating listener installed in host document");
                    true
                }
                Err(e) => {
                    debug!("could not install host listener: {}", e);
                    false
                }
            }
        } else {
            debug!("host document is cross-origin; relying on field resolver only");
            false
        };

        let identity = Arc::new(RwLock::new(HostIdentity::default()));

        tokio::spawn(Self::listen(widget_rx, Arc::clone(&identity)));

        let bridge = Arc::new(Self {
            doc,
            outbound: widget_tx,
            identity,
            injected,
        });

        let endpoint = HostEndpoint {
            from_widget: host_rx,
            to_widget: host_tx,
        };

        (bridge, endpoint)
    }

    /// Inbound listener: runs until the host drops its sender
    async fn listen(mut inbound: mpsc::Receiver<BridgeMessage>, identity: Arc<RwLock<HostIdentity>>) {
        while let Some(message) = inbound.recv().await {
            match message {
                BridgeMessage::UserInfo { name, email } => {
                    debug!(has_name = name.is_some(), has_email = email.is_some(), "host supplied identity");
                    let mut identity = identity.write().await;
                    identity.name = name.filter(|n| !n.is_empty());
                    identity.email = email.filter(|e| !e.is_empty());
                }
                other => {
                    debug!(?other, "ignoring unexpected host message");
                }
            }
        }
        debug!("host endpoint closed; bridge listener stopped");
    }

    /// Ask the host to supply identity. Best-effort.
    pub async fn request_user_info(&self) {
        self.send(BridgeMessage::RequestUserInfo).await;
    }

    /// Latest identity the host supplied, if any
    pub async fn identity(&self) -> HostIdentity {
        self.identity.read().await.clone()
    }

    /// Broadcast a finalized transcript. When the cooperating listener is
    /// installed, also hand the broadcast to the host document directly.
    pub async fn announce_ready(
        &self,
        question_id: &str,
        transcript: &str,
        answer_field_id: Option<&str>,
    ) {
        self.send(BridgeMessage::VoiceResponseReady {
            question_id: question_id.to_string(),
            transcript: transcript.to_string(),
            answer_field_id: answer_field_id.map(str::to_string),
        })
        .await;

        if self.injected && self.doc.deliver_ready(question_id, transcript, answer_field_id) {
            debug!("host listener applied transcript");
        }
    }

    /// Announce that the user discarded the response
    pub async fn announce_deleted(&self, question_id: &str) {
        self.send(BridgeMessage::VoiceResponseDeleted {
            question_id: question_id.to_string(),
        })
        .await;
    }

    async fn send(&self, message: BridgeMessage) {
        if self.outbound.send(message).await.is_err() {
            // A host that stopped listening is a normal condition
            warn!("host endpoint gone; message dropped");
        }
    }
}
