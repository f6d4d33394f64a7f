//! # Dossier Editor
//!
//! Live report documents and the update protocol that changes them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: XML / xml-js JSON → SerializedNode  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ blocks: dispatch table + tree builder       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Load documents, reset counters           │
//! │  - Interactive parameter stores             │
//! │  - Submit → invoke → build fragment → splice│
//! │  - Change events for the presentation layer │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dossier_editor::{Document, TemplateInvoker};
//!
//! let mut doc = Document::open("report.xml", RenderOptions::default())?;
//! let events = doc.subscribe();
//!
//! let region = doc.find_region("controls").unwrap();
//! doc.set_field(region, "range_field", 7)?;
//! doc.submit(region, &TemplateInvoker::new(response_template))?;
//!
//! while let Ok(event) = events.try_recv() {
//!     // re-render
//! }
//! ```

mod document;
mod errors;
mod handle;
mod invoke;
mod mutations;

pub use document::{Document, DocumentEvent};
pub use errors::EditorError;
pub use handle::DocumentHandle;
pub use invoke::{Invoke, InvokeError, Parameters, TemplateInvoker};
pub use mutations::{Mutation, MutationError, MutationResult};

// Re-export common types for convenience
pub use dossier_blocks::{Block, FieldValue, Method, RefId, RenderOptions, Submission};
