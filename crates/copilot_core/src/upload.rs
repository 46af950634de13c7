//! crates/copilot_core/src/upload.rs
//!
//! Pre-flight validation for upload batches. A single violation rejects the
//! whole batch before any placeholder is inserted or request issued.

/// File extensions the backend can ingest.
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".pptx", ".pdf", ".docx"];

/// Default per-file size cap, matching the backend's limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// A file selected for upload, read into memory.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PendingFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn extension(&self) -> String {
        match self.name.rsplit_once('.') {
            Some((_, ext)) => format!(".{}", ext.to_lowercase()),
            None => String::new(),
        }
    }

    fn has_allowed_extension(&self) -> bool {
        let extension = self.extension();
        ALLOWED_EXTENSIONS.contains(&extension.as_str())
    }
}

/// Why a batch was rejected, listing every offending filename.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PolicyViolation {
    #[error(
        "Invalid file type(s): {}. Only PPTX, PDF, and DOCX files are allowed.",
        .names.join(", ")
    )]
    DisallowedType { names: Vec<String> },
    #[error(
        "File(s) too large: {}. Maximum size is {} MB per file.",
        .names.join(", "),
        .max_mb
    )]
    Oversized { names: Vec<String>, max_mb: u64 },
}

/// The allow-list and size cap applied to every batch.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Checks the whole batch; the first kind of violation found aborts it.
    /// Type violations are reported before size violations, as the original
    /// flow checked them in that order.
    pub fn validate(&self, files: &[PendingFile]) -> Result<(), PolicyViolation> {
        let invalid: Vec<String> = files
            .iter()
            .filter(|file| !file.has_allowed_extension())
            .map(|file| file.name.clone())
            .collect();
        if !invalid.is_empty() {
            return Err(PolicyViolation::DisallowedType { names: invalid });
        }

        let oversized: Vec<String> = files
            .iter()
            .filter(|file| file.size() > self.max_bytes)
            .map(|file| file.name.clone())
            .collect();
        if !oversized.is_empty() {
            return Err(PolicyViolation::Oversized {
                names: oversized,
                max_mb: self.max_bytes / (1024 * 1024),
            });
        }
        Ok(())
    }
}
