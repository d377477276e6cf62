//! Sprite registry and symbol lifecycle.
//!
//! The registry owns one hidden `<svg>` container per document and inserts or
//! removes `<symbol>` fragments as icons mount and unmount. It works against
//! the [`Document`] trait; [`MemoryDocument`] is an in-memory implementation
//! used for static sprite assembly and tests. The JavaScript runtime shipped to
//! browsers implements the same state machine (see [`script`]).

pub mod dom;
pub mod hot;
pub mod memory;
pub mod module;
pub mod registry;
pub mod script;

pub use dom::{ContainerTarget, Document, ReadyState};
pub use hot::{HotContext, HotSlot};
pub use memory::{MemoryDocument, NodeId};
pub use module::IconModule;
pub use registry::{
    Diagnostics, RecordingDiagnostics, RegistryOptions, SpriteRegistry, SymbolHandle,
    TracingDiagnostics,
};
