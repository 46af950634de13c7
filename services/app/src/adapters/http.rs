//! services/app/src/adapters/http.rs
//!
//! The HTTP adapter for the course backend. Implements the question,
//! ingest, and catalog ports from the `core` crate over plain HTTP: JSON
//! responses, multipart requests, no retries. Wire records live here and
//! are mapped into the pure domain structs.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use copilot_core::domain::{
    Citation, Material, MaterialId, MaterialStatus, Module, ModuleId, UploadToken,
};
use copilot_core::ports::{
    AnswerPayload, CourseCatalog, IngestReceipt, IngestRequest, MaterialIngestService, PortError,
    PortResult, QuestionService,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// One adapter covers the whole backend: the original client talked to a
/// single FastAPI service for asking, uploading, and catalog reads.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` for the given base URL (no trailing
    /// slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct AskResponse {
    status: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    citations: Vec<CitationRecord>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct CitationRecord {
    source: String,
    #[serde(default)]
    content: Option<String>,
}

impl CitationRecord {
    fn to_domain(self) -> Citation {
        Citation {
            source: self.source,
            content: self.content,
        }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    upload_token: Option<Uuid>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct ModuleRecord {
    id: String,
    title: String,
    #[serde(default)]
    materials: Vec<MaterialRecord>,
}

impl ModuleRecord {
    fn to_domain(self) -> PortResult<Module> {
        let materials = self
            .materials
            .into_iter()
            .map(MaterialRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        Ok(Module {
            id: ModuleId(self.id),
            title: self.title,
            materials,
        })
    }
}

#[derive(Deserialize)]
struct MaterialRecord {
    id: String,
    name: String,
    size: String,
    #[serde(rename = "uploadDate")]
    upload_date: NaiveDate,
    status: String,
}

impl MaterialRecord {
    fn to_domain(self) -> PortResult<Material> {
        let status = match self.status.as_str() {
            "uploading" => MaterialStatus::Uploading,
            "processing" => MaterialStatus::Processing,
            "processed" => MaterialStatus::Processed,
            "error" => MaterialStatus::Error,
            other => {
                return Err(PortError::Unexpected(format!(
                    "unknown material status '{}'",
                    other
                )))
            }
        };
        Ok(Material {
            id: MaterialId(self.id),
            token: None,
            name: self.name,
            size: self.size,
            upload_date: self.upload_date,
            status,
            error: None,
        })
    }
}

/// Pulls a human-readable message out of a non-OK response body, falling
/// back to the status code.
async fn rejection_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body
            .error
            .or(body.detail)
            .unwrap_or_else(|| format!("request failed with status {}", status)),
        Err(_) => format!("request failed with status {}", status),
    }
}

fn transport(err: reqwest::Error) -> PortError {
    PortError::Unexpected(err.to_string())
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl QuestionService for HttpBackend {
    async fn ask(&self, question: &str) -> PortResult<AnswerPayload> {
        let form = Form::new().text("question", question.to_string());
        debug!(endpoint = "/ask", "submitting question");
        let response = self
            .http
            .post(self.endpoint("/ask"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(PortError::Rejected(rejection_message(response).await));
        }

        let body: AskResponse = response.json().await.map_err(transport)?;
        if body.status != "success" {
            return Err(PortError::Rejected(
                body.detail
                    .unwrap_or_else(|| "Unknown error occurred".to_string()),
            ));
        }
        let answer = body
            .answer
            .ok_or_else(|| PortError::Unexpected("response carried no answer".to_string()))?;
        Ok(AnswerPayload {
            answer,
            citations: body
                .citations
                .into_iter()
                .map(CitationRecord::to_domain)
                .collect(),
        })
    }
}

#[async_trait]
impl MaterialIngestService for HttpBackend {
    async fn upload(&self, request: IngestRequest) -> PortResult<IngestReceipt> {
        let file_part = Part::bytes(request.bytes).file_name(request.filename.clone());
        let form = Form::new()
            .part("file", file_part)
            .text("week_title", request.module_title)
            .text("upload_token", request.token.to_string());

        debug!(endpoint = "/upload", file = %request.filename, "uploading material");
        let response = self
            .http
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(PortError::Rejected(rejection_message(response).await));
        }

        let body: UploadResponse = response.json().await.map_err(transport)?;
        if let Some(error) = body.error {
            return Err(PortError::Rejected(error));
        }
        let id = body
            .id
            .ok_or_else(|| PortError::Unexpected("upload response carried no id".to_string()))?;
        let token = body.upload_token.map(UploadToken).ok_or_else(|| {
            PortError::Unexpected("upload response did not echo the token".to_string())
        })?;
        if token != request.token {
            return Err(PortError::Unexpected(format!(
                "upload response echoed a foreign token {}",
                token
            )));
        }
        Ok(IngestReceipt {
            id: MaterialId(id),
            token,
        })
    }
}

#[async_trait]
impl CourseCatalog for HttpBackend {
    async fn fetch_modules(&self) -> PortResult<Vec<Module>> {
        debug!(endpoint = "/materials", "fetching catalog");
        let response = self
            .http
            .get(self.endpoint("/materials"))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(PortError::Rejected(rejection_message(response).await));
        }

        let records: Vec<ModuleRecord> = response.json().await.map_err(transport)?;
        records.into_iter().map(ModuleRecord::to_domain).collect()
    }

    fn material_url(&self, filename: &str) -> String {
        self.endpoint(&format!("/uploads/{}", filename))
    }
}
