//! crates/copilot_core/src/domain.rs
//!
//! Pure data structures for the classroom co-pilot. These are independent of
//! any wire format or transport; adapters map their own records into them.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Stable identifier for a course module. Client-generated at creation;
/// replaced by the server-assigned value once the catalog round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId(pub String);

impl ModuleId {
    pub fn generate() -> Self {
        Self(format!("module-{}", Uuid::new_v4()))
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for a material. Starts as a client-side placeholder value and
/// is swapped for the server-assigned id when the upload completes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialId(pub String);

impl MaterialId {
    pub(crate) fn placeholder(token: UploadToken) -> Self {
        Self(format!("pending-{}", token))
    }
}

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlation token generated per upload attempt. The backend echoes it
/// back, and it is the only key uploads are reconciled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadToken(pub Uuid);

impl UploadToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for UploadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a material sits in the remote processing pipeline. The label only
/// ever moves forward; `Processed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialStatus {
    Uploading,
    Processing,
    Processed,
    Error,
}

impl MaterialStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MaterialStatus::Uploading => "uploading",
            MaterialStatus::Processing => "processing",
            MaterialStatus::Processed => "processed",
            MaterialStatus::Error => "error",
        }
    }

    /// Whether the pipeline may move from `self` to `next`.
    pub fn can_become(self, next: MaterialStatus) -> bool {
        use MaterialStatus::*;
        match (self, next) {
            (Uploading, _) => true,
            (Processing, Uploading) => false,
            (Processing, _) => true,
            (Processed, Processed) | (Error, Error) => true,
            (Processed, _) | (Error, _) => false,
        }
    }
}

impl std::fmt::Display for MaterialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded document inside a module.
#[derive(Debug, Clone)]
pub struct Material {
    pub id: MaterialId,
    /// Present while an upload attempt is still being reconciled.
    pub token: Option<UploadToken>,
    /// Original filename, immutable.
    pub name: String,
    /// Human-readable size, computed once from the raw byte count.
    pub size: String,
    /// Calendar date the upload was initiated.
    pub upload_date: NaiveDate,
    pub status: MaterialStatus,
    /// Failure message recorded when an upload ends in `Error`.
    pub error: Option<String>,
}

/// A course module ("week"). The title is derived from position and is
/// recomputed after every insert or delete, never stored independently.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub materials: Vec<Material>,
}

/// A source reference attached to an answer.
#[derive(Debug, Clone)]
pub struct Citation {
    pub source: String,
    pub content: Option<String>,
}

/// One entry in the append-only conversation log.
#[derive(Debug, Clone)]
pub enum ChatEntry {
    Question {
        text: String,
        asked_at: DateTime<Utc>,
    },
    Answer {
        text: String,
        citations: Vec<Citation>,
        answered_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

impl FontSize {
    pub fn as_str(self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }
}

/// Display preferences from the account-settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub theme: Theme,
    pub font_size: FontSize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            font_size: FontSize::Medium,
        }
    }
}

/// Formats a raw byte count the way the material list displays it:
/// whole bytes below 1 KiB, otherwise one decimal with a trailing `.0`
/// trimmed.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
    if exponent == 0 {
        return format!("{} {}", bytes, UNITS[0]);
    }
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[exponent])
    } else {
        format!("{:.1} {}", rounded, UNITS[exponent])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_matches_display_rules() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_size(26_214_400), "25 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn status_only_moves_forward() {
        use MaterialStatus::*;
        assert!(Uploading.can_become(Processing));
        assert!(Uploading.can_become(Processed));
        assert!(Uploading.can_become(Error));
        assert!(Processing.can_become(Processed));
        assert!(!Processing.can_become(Uploading));
        assert!(!Processed.can_become(Uploading));
        assert!(!Processed.can_become(Error));
        assert!(!Error.can_become(Processed));
    }
}
