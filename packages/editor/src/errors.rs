//! Error types for the editor

use dossier_blocks::{BuildError, RefId, UnknownFieldError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] dossier_parser::ParseError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),

    #[error("Invocation failed: {0}")]
    Invocation(String),

    #[error("Document root must be a View, found {found}")]
    NotAView { found: &'static str },

    #[error("Response must be wrapped in <View fragment=\"true\">")]
    NotAFragment,

    #[error("No interactive region with ref {0}")]
    RegionNotFound(RefId),

    #[error("Region {0} already has a submission in flight")]
    SubmissionPending(RefId),

    #[error("Document lock poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
