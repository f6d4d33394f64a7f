//! Shared access to one document from a presentation layer and any number of
//! in-flight submissions.
//!
//! A submission holds the lock only to snapshot its parameters and later to
//! build and splice the response. The invocation itself runs unlocked, so
//! readers and other regions stay responsive while it is out.

use crate::document::{Document, DocumentEvent};
use crate::invoke::Invoke;
use crate::mutations::MutationResult;
use crate::EditorError;
use dossier_blocks::{FieldValue, RefId};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Debug, Clone)]
pub struct DocumentHandle {
    inner: Arc<Mutex<Document>>,
}

impl DocumentHandle {
    pub fn new(document: Document) -> Self {
        Self {
            inner: Arc::new(Mutex::new(document)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Document>, EditorError> {
        self.inner.lock().map_err(|_| EditorError::Poisoned)
    }

    /// Run `f` against a consistent view of the document
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> Result<R, EditorError> {
        Ok(f(&*self.lock()?))
    }

    pub fn subscribe(&self) -> Result<Receiver<DocumentEvent>, EditorError> {
        Ok(self.lock()?.subscribe())
    }

    pub fn set_field(&self, region: RefId, name: &str, value: impl Into<FieldValue>) -> Result<(), EditorError> {
        self.lock()?.set_field(region, name, value)
    }

    pub fn load(&self, source: &str) -> Result<(), EditorError> {
        self.lock()?.load(source)
    }

    /// Submit a region. Fails with `SubmissionPending` if the same region
    /// already has a submission out.
    pub fn submit(&self, region: RefId, invoker: &dyn Invoke) -> Result<MutationResult, EditorError> {
        let submission = self.lock()?.begin_submission(region)?;
        info!(target_id = %submission.target, method = %submission.method, "dispatching submission");

        let response = invoker.invoke(&submission.target, submission.method, &submission.parameters);

        let mut document = self.lock()?;
        document.end_submission(region);
        let response = response.map_err(|e| EditorError::Invocation(e.to_string()))?;
        document.apply_response(&submission.target, submission.method, &response)
    }
}
