//! services/app/src/state.rs
//!
//! The shared application services, created once at startup.

use crate::config::Config;
use copilot_core::ports::{
    CourseCatalog, CredentialVerifier, MaterialIngestService, QuestionService,
};
use std::sync::Arc;

/// Every external collaborator the shell needs, behind its port trait. The
/// mutable course state itself lives in a `CourseStore` owned by the shell;
/// only ever touched from that one task.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub questions: Arc<dyn QuestionService>,
    pub ingest: Arc<dyn MaterialIngestService>,
    pub catalog: Arc<dyn CourseCatalog>,
    pub verifier: Arc<dyn CredentialVerifier>,
}
