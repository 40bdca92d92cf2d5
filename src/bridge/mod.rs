//! Cross-document messaging
//!
//! The widget and the host page cooperate over a small typed message
//! protocol. Delivery is inherently best-effort: nothing is ever thrown
//! across the document boundary, and a host that never answers is a
//! normal condition, not an error.

mod host;
mod messages;

pub use host::{HostBridge, HostEndpoint, HostIdentity};
pub use messages::BridgeMessage;
