//! Document I/O for composition
//!
//! Parsing and serialization run on the calling task and yield afterwards;
//! they are the points where a composition gives way to other in-flight
//! work.

use crate::types::*;
use lopdf::Document;

/// Parse a source PDF from raw bytes
pub async fn load_source(bytes: Vec<u8>) -> Result<Document> {
    let doc = Document::load_mem(&bytes).map_err(ComposeError::SourceLoad)?;
    tokio::task::yield_now().await;
    Ok(doc)
}

/// Serialize a composed document to bytes
pub async fn serialize(mut doc: Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)
        .map_err(|e| ComposeError::Serialization(e.to_string()))?;
    tokio::task::yield_now().await;
    Ok(writer)
}
