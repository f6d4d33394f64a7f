//! # Document
//!
//! A live report: the root View, the figure counters numbering its captions
//! and the dispatch table new fragments are classified with.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Build → (set fields → submit → build fragment → apply)* → Load ...
//!   ↓                                                      ↓
//! counters reset                            version bump + Changed event
//! ```
//!
//! Every structural edit goes through [`Document::apply`], which takes
//! `&mut self`; two edits of one document can never interleave.

use crate::invoke::Invoke;
use crate::mutations::{Mutation, MutationResult};
use crate::EditorError;
use dossier_blocks::{
    is_single_block_embed, Block, BlockKind, DispatchTable, FieldValue, FigureCounter, Method, RefId, RenderOptions, Submission,
    TreeBuilder, View,
};
use dossier_parser::{parse_any, SerializedNode};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{info, instrument, warn};

/// Notification sent to subscribers after the tree changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DocumentEvent {
    Loaded { version: u64 },
    Changed { version: u64, target: String, method: Method },
}

#[derive(Debug)]
pub struct Document {
    root: Block,
    counter: FigureCounter,
    table: DispatchTable,
    options: RenderOptions,

    /// Current version number (increments on each load and mutation)
    pub version: u64,

    subscribers: Vec<Sender<DocumentEvent>>,
    pending: HashSet<RefId>,
}

impl Document {
    /// Build a document from XML or xml-js JSON source
    pub fn from_source(source: &str, options: RenderOptions) -> Result<Self, EditorError> {
        Self::from_node(&parse_any(source)?, options)
    }

    pub fn open(path: impl AsRef<Path>, options: RenderOptions) -> Result<Self, EditorError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_source(&source, options)
    }

    pub fn from_node(node: &SerializedNode, options: RenderOptions) -> Result<Self, EditorError> {
        let table = DispatchTable::standard(&options);
        let mut counter = FigureCounter::new();
        let root = Self::build_root(node, &table, &mut counter)?;

        info!(blocks = root.count(), "loaded document");
        Ok(Self {
            root,
            counter,
            table,
            options,
            version: 1,
            subscribers: Vec::new(),
            pending: HashSet::new(),
        })
    }

    /// Replace the whole document. Counters restart; subscribers stay.
    pub fn load(&mut self, source: &str) -> Result<(), EditorError> {
        let node = parse_any(source)?;
        let mut counter = FigureCounter::new();
        let root = Self::build_root(&node, &self.table, &mut counter)?;

        self.root = root;
        self.counter = counter;
        self.pending.clear();
        self.version += 1;

        info!(version = self.version, blocks = self.root.count(), "reloaded document");
        self.emit(DocumentEvent::Loaded { version: self.version });
        Ok(())
    }

    fn build_root(node: &SerializedNode, table: &DispatchTable, counter: &mut FigureCounter) -> Result<Block, EditorError> {
        let root = TreeBuilder::new(table, counter).build(node)?;
        if root.as_view().is_none() {
            return Err(EditorError::NotAView {
                found: root.kind_name(),
            });
        }
        Ok(root)
    }

    pub fn root(&self) -> &Block {
        &self.root
    }

    pub fn view(&self) -> Option<&View> {
        self.root.as_view()
    }

    pub fn counter(&self) -> &FigureCounter {
        &self.counter
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn is_single_block_embed(&self) -> bool {
        is_single_block_embed(&self.root, self.options.mode)
    }

    /// Receive an event after every load and applied mutation
    pub fn subscribe(&mut self) -> Receiver<DocumentEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: DocumentEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Build a response document into the blocks it wraps. The response must
    /// be a `<View fragment="true">`. Captions in the fragment continue this
    /// document's numbering.
    pub fn build_fragment(&mut self, source: &str) -> Result<Vec<Block>, EditorError> {
        let node = parse_any(source)?;
        if !node.is("View") || node.attr("fragment") != Some("true") {
            return Err(EditorError::NotAFragment);
        }
        let wrapper = TreeBuilder::new(&self.table, &mut self.counter).build(&node)?;
        let found = wrapper.kind_name();
        match wrapper.kind {
            BlockKind::View(view) => Ok(view.region.into_children()),
            _ => Err(EditorError::NotAView { found }),
        }
    }

    /// Splice built blocks into the tree
    #[instrument(level = "debug", skip_all, fields(target_id = target, %method, blocks = fragment.len()))]
    pub fn apply(&mut self, target: &str, method: Method, fragment: Vec<Block>) -> Result<MutationResult, EditorError> {
        let mutation = Mutation::new(target, method);
        let inserted = fragment.len();

        let removed = match mutation.apply(&mut self.root, fragment) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(target_id = target, %method, error = %e, "mutation not applied");
                return Err(e.into());
            }
        };

        self.version += 1;
        info!(target_id = target, %method, inserted, version = self.version, "applied mutation");
        self.emit(DocumentEvent::Changed {
            version: self.version,
            target: target.to_string(),
            method,
        });

        Ok(MutationResult {
            version: self.version,
            mutation,
            inserted,
            removed: removed.and_then(|b| b.meta.id),
        })
    }

    /// Build a response document and splice it in. A response that fails to
    /// parse or build leaves the tree unchanged.
    pub fn apply_response(&mut self, target: &str, method: Method, response: &str) -> Result<MutationResult, EditorError> {
        Mutation::new(target, method).validate(&self.root)?;
        let fragment = self.build_fragment(response)?;
        self.apply(target, method, fragment)
    }

    /// Ref of the first Interactive region with `id`
    pub fn find_region(&self, id: &str) -> Option<RefId> {
        let mut found = None;
        self.root.walk(&mut |block, _| {
            if found.is_none() && block.id() == Some(id) && block.as_interactive().is_some() {
                found = Some(block.ref_id());
            }
        });
        found
    }

    /// Refs of all Interactive regions in pre-order
    pub fn regions(&self) -> Vec<RefId> {
        let mut refs = Vec::new();
        self.root.walk(&mut |block, _| {
            if block.as_interactive().is_some() {
                refs.push(block.ref_id());
            }
        });
        refs
    }

    pub fn set_field(&mut self, region: RefId, name: &str, value: impl Into<FieldValue>) -> Result<(), EditorError> {
        let interactive = self
            .root
            .find_by_ref_mut(region)
            .and_then(Block::as_interactive_mut)
            .ok_or(EditorError::RegionNotFound(region))?;
        interactive.set_field(name, value)?;
        Ok(())
    }

    /// Snapshot of a region's target, method and parameters
    pub fn submission(&self, region: RefId) -> Result<Submission, EditorError> {
        self.root
            .find_by_ref(region)
            .and_then(Block::as_interactive)
            .map(|i| i.submission())
            .ok_or(EditorError::RegionNotFound(region))
    }

    /// Submit a region and splice the response in, all while holding
    /// `&mut self`. See `DocumentHandle::submit` for the variant that lets
    /// readers in during the invocation.
    pub fn submit(&mut self, region: RefId, invoker: &dyn Invoke) -> Result<MutationResult, EditorError> {
        let submission = self.submission(region)?;
        info!(target_id = %submission.target, method = %submission.method, "dispatching submission");

        let response = invoker
            .invoke(&submission.target, submission.method, &submission.parameters)
            .map_err(|e| EditorError::Invocation(e.to_string()))?;
        self.apply_response(&submission.target, submission.method, &response)
    }

    /// Mark a region's submission as in flight and snapshot it
    pub fn begin_submission(&mut self, region: RefId) -> Result<Submission, EditorError> {
        let submission = self.submission(region)?;
        if !self.pending.insert(region) {
            return Err(EditorError::SubmissionPending(region));
        }
        Ok(submission)
    }

    pub fn end_submission(&mut self, region: RefId) {
        self.pending.remove(&region);
    }

    pub fn is_pending(&self, region: RefId) -> bool {
        self.pending.contains(&region)
    }
}
