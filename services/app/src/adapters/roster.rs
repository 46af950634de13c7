//! services/app/src/adapters/roster.rs
//!
//! In-memory credential roster implementing the `CredentialVerifier` port.
//! Passwords are held as argon2 hashes; nothing compares plaintext. State
//! lives only for the life of the process, matching the rest of the app.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tracing::warn;

use copilot_core::domain::Role;
use copilot_core::ports::{CredentialVerifier, PortError, PortResult, Registration};

struct RosterEntry {
    password_hash: String,
    role: Role,
}

/// One line of a roster file: `[{"username", "password_hash", "role"}]`.
#[derive(Deserialize)]
struct RosterRecord {
    username: String,
    password_hash: String,
    role: String,
}

pub struct RosterVerifier {
    entries: RwLock<HashMap<String, RosterEntry>>,
}

impl RosterVerifier {
    /// The demo roster: the two accounts the prototype shipped with.
    pub fn seeded() -> PortResult<Self> {
        let mut entries = HashMap::new();
        entries.insert(
            "student".to_string(),
            RosterEntry {
                password_hash: hash_password("password")?,
                role: Role::Student,
            },
        );
        entries.insert(
            "instructor".to_string(),
            RosterEntry {
                password_hash: hash_password("password")?,
                role: Role::Instructor,
            },
        );
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Loads a roster from a JSON file of pre-hashed records.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let records: Vec<RosterRecord> = serde_json::from_str(&raw)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let mut entries = HashMap::new();
        for record in records {
            let role = match record.role.as_str() {
                "student" => Role::Student,
                "instructor" => Role::Instructor,
                other => {
                    warn!(username = %record.username, role = %other, "skipping roster entry with unknown role");
                    continue;
                }
            };
            entries.insert(
                record.username,
                RosterEntry {
                    password_hash: record.password_hash,
                    role,
                },
            );
        }
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }
}

fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PortError::Unexpected(format!("failed to hash password: {}", e)))?
        .to_string())
}

#[async_trait]
impl CredentialVerifier for RosterVerifier {
    async fn verify(&self, username: &str, password: &str) -> PortResult<Role> {
        let entries = self
            .entries
            .read()
            .map_err(|_| PortError::Unexpected("roster lock poisoned".to_string()))?;
        let entry = entries.get(username).ok_or(PortError::Unauthorized)?;
        let parsed = PasswordHash::new(&entry.password_hash)
            .map_err(|e| PortError::Unexpected(format!("bad roster hash: {}", e)))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| PortError::Unauthorized)?;
        Ok(entry.role)
    }

    async fn register(&self, registration: Registration) -> PortResult<Role> {
        // Signup is simulated: the account lands in the in-memory roster as
        // a student, keyed by email.
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PortError::Unexpected("roster lock poisoned".to_string()))?;
        entries.insert(
            registration.email.clone(),
            RosterEntry {
                password_hash: hash_password(&registration.password)?,
                role: Role::Student,
            },
        );
        Ok(Role::Student)
    }
}
