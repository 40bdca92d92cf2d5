pub mod bridge;
pub mod config;
pub mod engine;
pub mod host;
pub mod http;
pub mod session;
pub mod transcript;
pub mod webhook;
pub mod widget;

pub use bridge::{BridgeMessage, HostBridge, HostEndpoint, HostIdentity};
pub use config::{Config, WidgetConfig};
pub use engine::{
    EngineError, EngineEvent, EngineFactory, EngineKind, EngineScript, PermissionState,
    ScriptStep, ScriptedEngine, SpeechEngine, TranscriptSegment,
};
pub use host::{
    AssignMode, FieldEvent, FieldResolver, FieldTarget, HostDocument, MemoryDocument, MemoryNode,
    NodeRef, NodeSnapshot, ResolveError, ResolverConfig, ResolutionStrategy,
};
pub use http::{create_router, AppState};
pub use session::{RecognitionSession, SessionError, SessionSnapshot, SessionState};
pub use transcript::{FinalOutcome, TranscriptReconciler};
pub use webhook::{resolve_identity, SubmissionRecord, WebhookClient};
pub use widget::{WidgetController, WidgetError, WidgetParams, WidgetSnapshot};
