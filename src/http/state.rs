use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::bridge::BridgeMessage;
use crate::config::Config;
use crate::widget::WidgetController;

/// A widget instance plus the host side of its message channel
pub struct WidgetEntry {
    pub controller: Arc<WidgetController>,
    /// Messages the widget sent to the host, drained by the messages route
    pub from_widget: Arc<Mutex<mpsc::Receiver<BridgeMessage>>>,
    /// Sender for host → widget messages
    pub to_widget: mpsc::Sender<BridgeMessage>,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active widget instances (widget_id → entry)
    pub widgets: Arc<RwLock<HashMap<String, Arc<WidgetEntry>>>>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            widgets: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }
}
