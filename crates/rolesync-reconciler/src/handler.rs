//! Upload event handling: event → object → manifest → batch.

use std::sync::Arc;

use tracing::info;

use crate::batch::{BatchProcessor, BatchSummary};
use crate::error::HandlerError;
use crate::event::UploadEvent;
use crate::manifest::Manifest;
use crate::store::ObjectStore;

/// Returned to the invoker once every row has been processed.
pub const SUCCESS_MARKER: &str = "Success";

/// Fetches announced manifests and runs them.
#[derive(Clone)]
pub struct ManifestHandler {
    store: Arc<dyn ObjectStore>,
    processor: BatchProcessor,
}

impl ManifestHandler {
    pub fn new(store: Arc<dyn ObjectStore>, processor: BatchProcessor) -> Self {
        Self { store, processor }
    }

    /// Handle a raw notification payload.
    pub async fn handle_json(&self, payload: &str) -> Result<BatchSummary, HandlerError> {
        let event = UploadEvent::from_json(payload)?;
        self.handle(&event).await
    }

    /// Fetch the manifest named by `event` and apply it.
    pub async fn handle(&self, event: &UploadEvent) -> Result<BatchSummary, HandlerError> {
        info!(bucket = %event.bucket, key = %event.key, "Processing file");

        let body = self.store.get_object(&event.bucket, &event.key).await?;
        let manifest = Manifest::parse(&body)?;
        Ok(self.processor.run(&manifest).await?)
    }
}

impl std::fmt::Debug for ManifestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestHandler")
            .field("processor", &self.processor)
            .finish_non_exhaustive()
    }
}
