use crate::{ComposeRequest, ComposeResponse, DocumentId};
use pdf_nup::Settings;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// Creates and releases display handles for composed documents.
///
/// Handles are owned by the coordinator; every handle it obtains from
/// [`create`](Self::create) is eventually passed back to
/// [`release`](Self::release), on replacement, removal, reset or drop.
pub trait PreviewProvider {
    type Handle;

    /// Build a preview for freshly composed bytes. `None` means no preview.
    fn create(&mut self, document_id: DocumentId, pdf_bytes: &[u8]) -> Option<Self::Handle>;

    fn release(&mut self, handle: Self::Handle);
}

/// Provider for hosts without a display surface
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPreview;

impl PreviewProvider for NoPreview {
    type Handle = ();

    fn create(&mut self, _document_id: DocumentId, _pdf_bytes: &[u8]) -> Option<()> {
        None
    }

    fn release(&mut self, _handle: ()) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Queued,
    Processing,
    Ready,
    Errored,
}

/// Status of the batch as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Idle,
    Processing,
    Errored,
    Ready,
}

/// State of one uploaded document
#[derive(Debug)]
pub struct DocumentRecord<H> {
    id: DocumentId,
    name: String,
    source_bytes: Vec<u8>,
    status: DocumentStatus,
    result_bytes: Option<Vec<u8>>,
    preview: Option<H>,
    error_message: Option<String>,
    revision: u64,
}

impl<H> DocumentRecord<H> {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the uploaded source
    pub fn byte_size(&self) -> usize {
        self.source_bytes.len()
    }

    pub fn source_bytes(&self) -> &[u8] {
        &self.source_bytes
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    /// Bytes of the most recent successful composition
    pub fn result_bytes(&self) -> Option<&[u8]> {
        self.result_bytes.as_deref()
    }

    pub fn preview(&self) -> Option<&H> {
        self.preview.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Number of dispatches so far; only the latest one is applied
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Owns the per-document records of a batch and keeps them in sync with a
/// composition service.
///
/// Every dispatch bumps the record's revision. Responses are applied only if
/// their record still exists and their revision is the record's current one,
/// so removed documents and superseded settings never overwrite newer state.
pub struct BatchCoordinator<P: PreviewProvider = NoPreview> {
    records: BTreeMap<DocumentId, DocumentRecord<P::Handle>>,
    next_id: u64,
    active_id: Option<DocumentId>,
    settings: Settings,
    request_tx: mpsc::UnboundedSender<ComposeRequest>,
    response_rx: mpsc::UnboundedReceiver<ComposeResponse>,
    previews: P,
}

impl BatchCoordinator<NoPreview> {
    /// Coordinator without previews
    pub fn headless(
        request_tx: mpsc::UnboundedSender<ComposeRequest>,
        response_rx: mpsc::UnboundedReceiver<ComposeResponse>,
    ) -> Self {
        Self::new(request_tx, response_rx, NoPreview)
    }
}

impl<P: PreviewProvider> BatchCoordinator<P> {
    pub fn new(
        request_tx: mpsc::UnboundedSender<ComposeRequest>,
        response_rx: mpsc::UnboundedReceiver<ComposeResponse>,
        previews: P,
    ) -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
            active_id: None,
            settings: Settings::default(),
            request_tx,
            response_rx,
            previews,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    pub fn get(&self, id: DocumentId) -> Option<&DocumentRecord<P::Handle>> {
        self.records.get(&id)
    }

    /// Records in registration order
    pub fn records(&self) -> impl Iterator<Item = &DocumentRecord<P::Handle>> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active_id
    }

    pub fn active(&self) -> Option<&DocumentRecord<P::Handle>> {
        self.active_id.and_then(|id| self.records.get(&id))
    }

    /// Select the displayed document. Unknown ids are ignored.
    pub fn set_active(&mut self, id: DocumentId) -> bool {
        if self.records.contains_key(&id) {
            self.active_id = Some(id);
            true
        } else {
            log::debug!("Ignoring selection of unknown document {}", id);
            false
        }
    }

    pub fn status(&self) -> BatchStatus {
        if self.records.is_empty() {
            return BatchStatus::Idle;
        }

        let mut any_errored = false;
        for record in self.records.values() {
            match record.status {
                DocumentStatus::Queued | DocumentStatus::Processing => {
                    return BatchStatus::Processing;
                }
                DocumentStatus::Errored => any_errored = true,
                DocumentStatus::Ready => {}
            }
        }

        if any_errored {
            BatchStatus::Errored
        } else {
            BatchStatus::Ready
        }
    }

    /// Add a document to the batch and dispatch its first composition
    pub fn register(&mut self, name: impl Into<String>, source_bytes: Vec<u8>) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;

        let record = DocumentRecord {
            id,
            name: name.into(),
            source_bytes,
            status: DocumentStatus::Queued,
            result_bytes: None,
            preview: None,
            error_message: None,
            revision: 0,
        };
        log::debug!(
            "Registered document {} ({}, {} bytes)",
            id,
            record.name,
            record.byte_size()
        );
        self.records.insert(id, record);

        if self.active_id.is_none() {
            self.active_id = Some(id);
        }

        self.dispatch(id);
        id
    }

    /// Store new settings and recompose every document with them
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        log::debug!(
            "Settings changed, recomposing {} document(s)",
            self.records.len()
        );

        let ids: Vec<DocumentId> = self.records.keys().copied().collect();
        for id in ids {
            self.dispatch(id);
        }
    }

    /// Remove a document. A composition still in flight for it is discarded
    /// when it completes.
    pub fn remove(&mut self, id: DocumentId) -> bool {
        let Some(mut record) = self.records.remove(&id) else {
            return false;
        };
        if let Some(handle) = record.preview.take() {
            self.previews.release(handle);
        }
        log::debug!("Removed document {} ({})", id, record.name);

        if self.active_id == Some(id) {
            self.active_id = self.records.keys().next().copied();
        }
        true
    }

    /// Drop every document. Settings are kept.
    pub fn reset(&mut self) {
        self.release_all_previews();
        self.records.clear();
        self.active_id = None;
        log::debug!("Batch reset");
    }

    /// Apply a response from the composition service.
    ///
    /// Returns false when the response was discarded because its document is
    /// gone or a newer dispatch superseded it.
    pub fn apply(&mut self, response: ComposeResponse) -> bool {
        let id = response.document_id();
        let Some(record) = self.records.get_mut(&id) else {
            log::debug!("Discarding result for removed document {}", id);
            return false;
        };
        if record.revision != response.revision() {
            log::warn!(
                "Discarding stale result for document {} (revision {}, current {})",
                id,
                response.revision(),
                record.revision
            );
            return false;
        }

        match response {
            ComposeResponse::Success { output_bytes, .. } => {
                if let Some(old) = record.preview.take() {
                    self.previews.release(old);
                }
                record.preview = self.previews.create(id, &output_bytes);
                record.result_bytes = Some(output_bytes);
                record.error_message = None;
                record.status = DocumentStatus::Ready;
                log::info!("Document {} ({}) is ready", id, record.name);
            }
            ComposeResponse::Failure { message, .. } => {
                log::warn!("Document {} ({}) failed: {}", id, record.name, message);
                record.error_message = Some(message);
                record.status = DocumentStatus::Errored;
            }
        }
        true
    }

    /// Apply every response that has already arrived, without waiting.
    ///
    /// Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(response) = self.response_rx.try_recv() {
            if self.apply(response) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next response and apply it.
    ///
    /// Returns `None` once the service has gone away, otherwise whether the
    /// response was applied.
    pub async fn next_response(&mut self) -> Option<bool> {
        let response = self.response_rx.recv().await?;
        Some(self.apply(response))
    }

    /// Wait until no document is queued or processing.
    ///
    /// If the service stops before answering, the pending documents are
    /// marked errored.
    pub async fn wait_until_settled(&mut self) -> BatchStatus {
        while self.has_pending() {
            if self.next_response().await.is_none() {
                self.fail_pending("Composition service stopped");
                break;
            }
        }
        self.status()
    }

    fn has_pending(&self) -> bool {
        self.records.values().any(|r| {
            matches!(
                r.status,
                DocumentStatus::Queued | DocumentStatus::Processing
            )
        })
    }

    fn fail_pending(&mut self, message: &str) {
        for record in self.records.values_mut() {
            if matches!(
                record.status,
                DocumentStatus::Queued | DocumentStatus::Processing
            ) {
                log::error!("Document {} ({}): {}", record.id, record.name, message);
                record.status = DocumentStatus::Errored;
                record.error_message = Some(message.to_string());
            }
        }
    }

    fn dispatch(&mut self, id: DocumentId) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        record.revision += 1;
        record.status = DocumentStatus::Processing;

        let request = ComposeRequest::Process {
            document_id: id,
            revision: record.revision,
            source_bytes: record.source_bytes.clone(),
            settings: self.settings,
        };
        log::debug!("Dispatching document {} (revision {})", id, record.revision);

        if self.request_tx.send(request).is_err() {
            log::error!("Composition service is not running; document {} not composed", id);
            record.status = DocumentStatus::Errored;
            record.error_message = Some("Composition service is not running".to_string());
        }
    }

    fn release_all_previews(&mut self) {
        for record in self.records.values_mut() {
            if let Some(handle) = record.preview.take() {
                self.previews.release(handle);
            }
        }
    }
}

impl<P: PreviewProvider> Drop for BatchCoordinator<P> {
    fn drop(&mut self) {
        self.release_all_previews();
    }
}
