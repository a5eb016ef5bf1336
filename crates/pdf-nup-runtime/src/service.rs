use crate::{ComposeRequest, ComposeResponse};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Composition worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Owned execution context for compositions.
///
/// One worker task receives requests and runs each as its own task.
/// Compositions do their work on that task and yield between loading,
/// rendering and serialization, so on a current-thread runtime they
/// interleave at those points and never compute in parallel. A multi-thread
/// runtime may run separate compositions on separate workers.
pub struct CompositionService {
    request_tx: mpsc::UnboundedSender<ComposeRequest>,
    worker: JoinHandle<()>,
}

impl CompositionService {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// Returns the service and the receiver on which responses arrive.
    pub fn spawn() -> (Self, mpsc::UnboundedReceiver<ComposeResponse>) {
        Self::spawn_with_limit(None)
    }

    /// Like [`spawn`](Self::spawn), but every composition stops after the
    /// first `max_sheets` output sheets.
    pub fn spawn_preview(max_sheets: usize) -> (Self, mpsc::UnboundedReceiver<ComposeResponse>) {
        Self::spawn_with_limit(Some(max_sheets))
    }

    fn spawn_with_limit(
        max_sheets: Option<usize>,
    ) -> (Self, mpsc::UnboundedReceiver<ComposeResponse>) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(worker_task(request_rx, response_tx, max_sheets));
        log::debug!("Composition service started (sheet limit: {:?})", max_sheets);

        (Self { request_tx, worker }, response_rx)
    }

    /// A sender for submitting requests to this service
    pub fn sender(&self) -> mpsc::UnboundedSender<ComposeRequest> {
        self.request_tx.clone()
    }

    /// Stop accepting requests and wait for in-flight compositions.
    ///
    /// The worker exits once every sender (including the ones handed out by
    /// [`sender`](Self::sender)) is dropped and all dispatched requests have
    /// produced a response.
    pub async fn shutdown(self) -> Result<(), ServiceError> {
        let Self { request_tx, worker } = self;
        drop(request_tx);
        worker.await?;
        Ok(())
    }
}

/// Async worker task that runs compositions and sends responses
async fn worker_task(
    mut request_rx: mpsc::UnboundedReceiver<ComposeRequest>,
    response_tx: mpsc::UnboundedSender<ComposeResponse>,
    max_sheets: Option<usize>,
) {
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            request = request_rx.recv() => match request {
                Some(request) => {
                    in_flight.spawn(process_request(request, response_tx.clone(), max_sheets));
                }
                None => break,
            },
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    log::error!("Composition task failed: {}", e);
                }
            }
        }
    }

    // No cancellation: everything already dispatched runs to completion
    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            log::error!("Composition task failed: {}", e);
        }
    }

    log::debug!("Composition service stopped");
}

async fn process_request(
    request: ComposeRequest,
    response_tx: mpsc::UnboundedSender<ComposeResponse>,
    max_sheets: Option<usize>,
) {
    let ComposeRequest::Process {
        document_id,
        revision,
        source_bytes,
        settings,
    } = request;

    log::debug!(
        "Composing document {} (revision {}, {} bytes)",
        document_id,
        revision,
        source_bytes.len()
    );

    let result = match max_sheets {
        Some(limit) => pdf_nup::run_preview(source_bytes, settings, limit).await,
        None => pdf_nup::run(source_bytes, settings).await,
    };

    let response = match result {
        Ok(output_bytes) => {
            log::info!(
                "Composed document {} ({} bytes)",
                document_id,
                output_bytes.len()
            );
            ComposeResponse::Success {
                document_id,
                revision,
                output_bytes,
            }
        }
        Err(e) => {
            log::warn!("Failed to compose document {}: {}", document_id, e);
            ComposeResponse::Failure {
                document_id,
                revision,
                message: e.to_string(),
            }
        }
    };

    // A closed channel means the coordinator is gone; nobody is waiting
    let _ = response_tx.send(response);
}
