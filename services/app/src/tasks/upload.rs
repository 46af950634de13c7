//! services/app/src/tasks/upload.rs
//!
//! Drives one upload batch: validate everything up front, then process the
//! files strictly in sequence. A file that fails after validation does not
//! stop its siblings; the whole batch only aborts on a pre-flight policy
//! violation.

use tracing::{info, warn};

use copilot_core::domain::ModuleId;
use copilot_core::ports::{IngestRequest, MaterialIngestService};
use copilot_core::store::{CourseStore, UploadResolution};
use copilot_core::upload::{PendingFile, PolicyViolation, UploadPolicy};

/// Per-batch outcome, filenames in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchReport {
    pub fn fully_successful(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadBatchError {
    /// The batch violated the upload policy; nothing was inserted or sent.
    #[error(transparent)]
    Rejected(#[from] PolicyViolation),
    #[error("No such module")]
    UnknownModule,
}

pub async fn upload_batch(
    store: &mut CourseStore,
    ingest: &dyn MaterialIngestService,
    policy: &UploadPolicy,
    module_id: &ModuleId,
    files: Vec<PendingFile>,
) -> Result<BatchReport, UploadBatchError> {
    let mut report = BatchReport::default();
    if files.is_empty() {
        return Ok(report);
    }
    policy.validate(&files)?;

    let module_title = store
        .module(module_id)
        .map(|module| module.title.clone())
        .ok_or(UploadBatchError::UnknownModule)?;

    for file in files {
        let name = file.name.clone();
        let size = file.size();
        let token = store
            .begin_upload(module_id, &name, size)
            .ok_or(UploadBatchError::UnknownModule)?;
        info!(file = %name, module = %module_title, "upload started");

        let request = IngestRequest {
            token,
            filename: name.clone(),
            module_title: module_title.clone(),
            bytes: file.bytes,
        };
        match ingest.upload(request).await {
            Ok(receipt) => {
                store.resolve_upload(
                    module_id,
                    token,
                    UploadResolution::Completed { id: receipt.id },
                );
                info!(file = %name, "upload processed");
                report.completed.push(name);
            }
            Err(err) => {
                let message = format!("Failed to upload {}. {}", name, err);
                warn!(file = %name, error = %err, "upload failed");
                store.resolve_upload(module_id, token, UploadResolution::Failed { message });
                report.failed.push(name);
            }
        }
    }
    Ok(report)
}
