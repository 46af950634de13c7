//! crates/copilot_core/src/ports.rs
//!
//! Service contracts (traits) for the application's core logic. These traits
//! form the boundary of the hexagonal architecture, keeping the core
//! independent of the HTTP backend and the terminal front-end.

use async_trait::async_trait;

use crate::domain::{Citation, MaterialId, Module, Role, UploadToken};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations. Abstracts away the specific
/// errors of external collaborators (network transport, credential stores).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Rejected(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The answer produced for one question, with whatever source citations the
/// backend attached.
#[derive(Debug, Clone)]
pub struct AnswerPayload {
    pub answer: String,
    pub citations: Vec<Citation>,
}

#[async_trait]
pub trait QuestionService: Send + Sync {
    /// Submits a free-text question and returns the generated answer.
    async fn ask(&self, question: &str) -> PortResult<AnswerPayload>;
}

/// One file upload as handed to the backend.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub token: UploadToken,
    pub filename: String,
    pub module_title: String,
    pub bytes: Vec<u8>,
}

/// The backend's acknowledgement for one uploaded file. The echoed token is
/// the only key the store matches on when swapping the placeholder.
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub id: MaterialId,
    pub token: UploadToken,
}

#[async_trait]
pub trait MaterialIngestService: Send + Sync {
    /// Uploads a single file and returns the server-assigned identifier.
    async fn upload(&self, request: IngestRequest) -> PortResult<IngestReceipt>;
}

#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// Fetches the full module/material tree for initial population.
    async fn fetch_modules(&self) -> PortResult<Vec<Module>>;

    /// Where a processed material can be viewed.
    fn material_url(&self, filename: &str) -> String;
}

/// A new account as entered on the signup form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Checks a username/password pair and returns the account's role.
    async fn verify(&self, username: &str, password: &str) -> PortResult<Role>;

    /// Creates an account and returns the role it signed in with.
    async fn register(&self, registration: Registration) -> PortResult<Role>;
}

#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    /// Asks the user to confirm a destructive action; `false` drops it.
    async fn confirm(&self, prompt: &str) -> bool;
}
