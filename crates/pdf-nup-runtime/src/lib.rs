//! Batch processing for n-up composition.
//!
//! A [`CompositionService`] owns the worker that runs compositions; a
//! [`BatchCoordinator`] tracks every uploaded document and talks to the
//! service through a request/response channel pair keyed by document id.

mod coordinator;
mod naming;
mod service;

pub use coordinator::*;
pub use naming::{format_file_size, output_file_name};
pub use service::*;

// Re-export types from the composition crate
pub use pdf_nup::{ComposeError, PaperMode, Rotation, Settings};

use std::fmt;

/// Handle to a document in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Requests sent from the coordinator to the composition service
#[derive(Debug)]
pub enum ComposeRequest {
    Process {
        document_id: DocumentId,
        /// Dispatch counter of the document; responses echo it back
        revision: u64,
        source_bytes: Vec<u8>,
        settings: Settings,
    },
}

/// Responses sent from the composition service to the coordinator
#[derive(Debug, Clone)]
pub enum ComposeResponse {
    Success {
        document_id: DocumentId,
        revision: u64,
        output_bytes: Vec<u8>,
    },
    Failure {
        document_id: DocumentId,
        revision: u64,
        message: String,
    },
}

impl ComposeResponse {
    pub fn document_id(&self) -> DocumentId {
        match self {
            ComposeResponse::Success { document_id, .. }
            | ComposeResponse::Failure { document_id, .. } => *document_id,
        }
    }

    pub fn revision(&self) -> u64 {
        match self {
            ComposeResponse::Success { revision, .. }
            | ComposeResponse::Failure { revision, .. } => *revision,
        }
    }
}
