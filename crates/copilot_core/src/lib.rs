pub mod domain;
pub mod ports;
pub mod store;
pub mod upload;

pub use domain::{
    format_size, ChatEntry, Citation, FontSize, Material, MaterialId, MaterialStatus, Module,
    ModuleId, Preferences, Role, Theme, UploadToken,
};
pub use ports::{
    AnswerPayload, ConfirmationGate, CourseCatalog, CredentialVerifier, IngestReceipt,
    IngestRequest, MaterialIngestService, PortError, PortResult, QuestionService, Registration,
};
pub use store::{CourseStore, UploadResolution};
pub use upload::{PendingFile, PolicyViolation, UploadPolicy, ALLOWED_EXTENSIONS};
