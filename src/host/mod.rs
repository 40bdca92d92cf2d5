//! Host document access
//!
//! The widget runs inside a document it does not control: no stable
//! markup contract, no guarantee a node survives a re-render. This module
//! provides:
//! - The `HostDocument` trait: weak node handles, probes, best-effort
//!   mutation and event dispatch
//! - `MemoryDocument`: an in-memory host page for tests and the demo
//!   service
//! - `FieldResolver`: the ordered heuristic cascade that locates the
//!   answer field and writes the transcript into it

mod document;
mod memory;
mod resolver;

pub use document::{AssignMode, FieldEvent, HostDocument, NodeRef, NodeSnapshot};
pub use memory::{MemoryDocument, MemoryNode};
pub use resolver::{FieldResolver, FieldTarget, ResolveError, ResolverConfig, ResolutionStrategy};
