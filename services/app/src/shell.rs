//! services/app/src/shell.rs
//!
//! The interactive terminal front-end: sign-in, the question prompt, and
//! the instructor's module/material commands. Owns the `CourseStore`, so
//! all state mutation happens on this one task.

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

use copilot_core::domain::{
    ChatEntry, FontSize, MaterialStatus, Module, ModuleId, Role, Theme,
};
use copilot_core::ports::{ConfirmationGate, PortError, Registration};
use copilot_core::store::CourseStore;
use copilot_core::upload::{PendingFile, UploadPolicy};

use crate::error::AppError;
use crate::state::AppState;
use crate::tasks::{catalog, chat, upload};

//=========================================================================================
// Terminal input
//=========================================================================================

/// Line-oriented stdin shared between the command loop and confirmation
/// prompts.
pub struct TermInput {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl TermInput {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Prints `prompt` and reads one line. `None` means end of input.
    pub async fn prompt(&self, prompt: &str) -> std::io::Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        self.lines.lock().await.next_line().await
    }
}

impl Default for TermInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfirmationGate for TermInput {
    async fn confirm(&self, prompt: &str) -> bool {
        match self.prompt(&format!("{prompt} [y/N] ")).await {
            Ok(Some(line)) => line.trim().eq_ignore_ascii_case("y"),
            _ => false,
        }
    }
}

//=========================================================================================
// The shell
//=========================================================================================

pub struct Shell {
    state: AppState,
    store: CourseStore,
    policy: UploadPolicy,
    input: Arc<TermInput>,
}

impl Shell {
    pub fn new(state: AppState) -> Self {
        let policy = UploadPolicy::with_max_bytes(state.config.max_upload_bytes);
        Self {
            state,
            store: CourseStore::new(),
            policy,
            input: Arc::new(TermInput::new()),
        }
    }

    pub async fn run(&mut self) -> Result<(), AppError> {
        println!("AI Classroom Co-Pilot");
        loop {
            if self.store.role().is_none() {
                if !self.sign_in().await? {
                    return Ok(());
                }
                match catalog::load_catalog(&mut self.store, self.state.catalog.as_ref()).await {
                    Ok(count) => println!("Loaded {count} module(s) from the course catalog."),
                    Err(err) => {
                        // Same posture as the original: start empty, stay usable.
                        warn!(error = %err, "could not load course materials");
                        println!("Could not load course materials: {err}");
                    }
                }
                println!("Type 'help' for the command list.");
            }

            let Some(line) = self.input.prompt("> ").await? else {
                return Ok(());
            };
            if !self.dispatch(line.trim()).await? {
                return Ok(());
            }
        }
    }

    //=====================================================================================
    // Sign-in and registration
    //=====================================================================================

    /// Returns `false` when input ended or the user quit at the login
    /// prompt.
    async fn sign_in(&mut self) -> Result<bool, AppError> {
        loop {
            let Some(username) = self.input.prompt("Username (or 'register'): ").await? else {
                return Ok(false);
            };
            let username = username.trim().to_string();
            match username.as_str() {
                "" => continue,
                "quit" | "exit" => return Ok(false),
                "register" => {
                    self.register().await?;
                    if self.store.role().is_some() {
                        return Ok(true);
                    }
                    continue;
                }
                _ => {}
            }
            let Some(password) = self.input.prompt("Password: ").await? else {
                return Ok(false);
            };
            match self
                .state
                .verifier
                .verify(&username, password.trim())
                .await
            {
                Ok(role) => {
                    self.store.sign_in(role);
                    println!("Signed in as {} ({}).", username, role.as_str());
                    return Ok(true);
                }
                Err(PortError::Unauthorized) => println!("Incorrect username or password."),
                Err(err) => println!("Sign-in failed: {err}"),
            }
        }
    }

    async fn register(&mut self) -> Result<(), AppError> {
        let Some(first_name) = self.input.prompt("First name: ").await? else {
            return Ok(());
        };
        let Some(last_name) = self.input.prompt("Last name: ").await? else {
            return Ok(());
        };
        let Some(email) = self.input.prompt("Email address: ").await? else {
            return Ok(());
        };
        let Some(password) = self.input.prompt("Password: ").await? else {
            return Ok(());
        };
        let Some(confirm) = self.input.prompt("Confirm password: ").await? else {
            return Ok(());
        };

        let password = password.trim();
        if password != confirm.trim() {
            println!("Passwords do not match.");
            return Ok(());
        }
        if password.chars().count() < 6 {
            println!("Password must be at least 6 characters.");
            return Ok(());
        }

        let registration = Registration {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        match self.state.verifier.register(registration.clone()).await {
            Ok(role) => {
                self.store.sign_in(role);
                println!(
                    "Account created for {} {} ({}).",
                    registration.first_name, registration.last_name, registration.email
                );
            }
            Err(err) => println!("Could not create the account: {err}"),
        }
        Ok(())
    }

    //=====================================================================================
    // Command dispatch
    //=====================================================================================

    /// Returns `false` to leave the shell.
    async fn dispatch(&mut self, line: &str) -> Result<bool, AppError> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match command {
            "" => {}
            "help" => print_help(),
            "ask" => self.ask(rest).await,
            "history" => self.history(),
            "clear" => {
                self.store.clear_conversation();
                println!("Conversation history cleared.");
            }
            "modules" => self.list_modules(),
            "add-module" => self.add_module(rest),
            "delete-module" => self.delete_module(rest).await,
            "upload" => self.upload(rest).await,
            "delete-material" => self.delete_material(rest).await,
            "view" => self.view(rest),
            "settings" => self.settings(rest),
            "logout" => {
                self.store.sign_out();
                self.store.clear_conversation();
                println!("Signed out.");
            }
            "quit" | "exit" => return Ok(false),
            other => println!("Unknown command '{other}'. Type 'help' for the command list."),
        }
        Ok(true)
    }

    async fn ask(&mut self, text: &str) {
        match chat::submit_question(&mut self.store, self.state.questions.as_ref(), text).await {
            Ok(()) => {
                if let Some(ChatEntry::Answer { text, citations, .. }) =
                    self.store.conversation().last()
                {
                    println!("{text}");
                    if !citations.is_empty() {
                        println!("Sources:");
                        for citation in citations {
                            match &citation.content {
                                Some(content) => println!("  - {}: {}", citation.source, content),
                                None => println!("  - {}", citation.source),
                            }
                        }
                    }
                }
            }
            Err(err) => {
                println!("⚠ {err}");
                let kept = text.trim();
                if !kept.is_empty() {
                    // The question is not lost on failure; hand it back.
                    println!("Your question was kept: {kept}");
                }
            }
        }
    }

    fn history(&self) {
        if self.store.conversation().is_empty() {
            println!("No conversation yet.");
            return;
        }
        for entry in self.store.conversation() {
            match entry {
                ChatEntry::Question { text, .. } => println!("You: {text}"),
                ChatEntry::Answer { text, citations, .. } => {
                    println!("Co-Pilot: {text}");
                    for citation in citations {
                        println!("          [{}]", citation.source);
                    }
                }
            }
        }
    }

    //=====================================================================================
    // Module and material commands
    //=====================================================================================

    fn list_modules(&self) {
        if self.store.modules().is_empty() {
            println!("No modules have been added yet.");
            if self.store.role() == Some(Role::Instructor) {
                println!("Use 'add-module' to start organizing your materials.");
            }
            return;
        }
        for module in self.store.modules() {
            println!("{} ({} material(s))", module.title, module.materials.len());
            for material in &module.materials {
                println!(
                    "  - {}  {}  uploaded {}  [{}]",
                    material.name, material.size, material.upload_date, material.status
                );
                if let Some(message) = &material.error {
                    println!("    ⚠ {message}");
                }
            }
        }
    }

    fn add_module(&mut self, rest: &str) {
        if !self.require_instructor() {
            return;
        }
        let at = match rest {
            "" => None,
            raw => match raw.parse::<usize>() {
                // Positions are 1-based on the command line.
                Ok(position) if position >= 1 => Some(position - 1),
                _ => {
                    println!("Usage: add-module [position]");
                    return;
                }
            },
        };
        let id = self.store.add_module(at);
        let title = self
            .store
            .module(&id)
            .map(|module| module.title.clone())
            .unwrap_or_default();
        println!("Added {title}.");
    }

    async fn delete_module(&mut self, rest: &str) {
        if !self.require_instructor() {
            return;
        }
        let Some(id) = self.module_by_position(rest) else {
            println!("Usage: delete-module <module number>");
            return;
        };
        let gate = self.input.clone();
        if catalog::delete_module(&mut self.store, gate.as_ref(), &id).await {
            println!("Module deleted.");
        }
    }

    async fn upload(&mut self, rest: &str) {
        if !self.require_instructor() {
            return;
        }
        let mut args = rest.split_whitespace();
        let Some(id) = args.next().and_then(|raw| self.module_by_position(raw)) else {
            println!("Usage: upload <module number> <file> [file...]");
            return;
        };
        let paths: Vec<&str> = args.collect();
        if paths.is_empty() {
            println!("Usage: upload <module number> <file> [file...]");
            return;
        }

        let mut files = Vec::new();
        for path in paths {
            let bytes = match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    println!("Could not read {path}: {err}");
                    return;
                }
            };
            let name = Path::new(path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
            files.push(PendingFile { name, bytes });
        }

        match upload::upload_batch(
            &mut self.store,
            self.state.ingest.as_ref(),
            &self.policy,
            &id,
            files,
        )
        .await
        {
            Err(err) => println!("⚠ {err}"),
            Ok(report) => {
                for name in &report.completed {
                    println!("✓ {name} uploaded & ingested successfully.");
                }
                if report.fully_successful() {
                    // The upload form dismisses itself shortly after a fully
                    // successful batch.
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    println!("(upload form closed)");
                } else if let Some(module) = self.store.module(&id) {
                    for name in &report.failed {
                        if let Some(message) = module
                            .materials
                            .iter()
                            .find(|material| &material.name == name)
                            .and_then(|material| material.error.as_deref())
                        {
                            println!("⚠ {message}");
                        }
                    }
                }
            }
        }
    }

    async fn delete_material(&mut self, rest: &str) {
        if !self.require_instructor() {
            return;
        }
        let mut args = rest.split_whitespace();
        let module_id = args.next().and_then(|raw| self.module_by_position(raw));
        let (Some(module_id), Some(name)) = (module_id, args.next()) else {
            println!("Usage: delete-material <module number> <filename>");
            return;
        };
        let Some(material_id) = self.store.module(&module_id).and_then(|module| {
            module
                .materials
                .iter()
                .find(|material| material.name == name)
                .map(|material| material.id.clone())
        }) else {
            println!("No material named '{name}' in that module.");
            return;
        };
        let gate = self.input.clone();
        if catalog::delete_material(&mut self.store, gate.as_ref(), &module_id, &material_id).await
        {
            println!("Material deleted.");
        }
    }

    fn view(&self, rest: &str) {
        let mut args = rest.split_whitespace();
        let module = args
            .next()
            .and_then(|raw| self.module_by_position(raw))
            .and_then(|id| self.store.module(&id).cloned());
        let (Some(module), Some(name)) = (module, args.next()) else {
            println!("Usage: view <module number> <filename>");
            return;
        };
        match module
            .materials
            .iter()
            .find(|material| material.name == name)
        {
            Some(material) if material.status == MaterialStatus::Processed => {
                println!("{}", self.state.catalog.material_url(&material.name));
            }
            Some(_) => println!("Only processed materials can be viewed."),
            None => println!("No material named '{name}' in that module."),
        }
    }

    fn settings(&mut self, rest: &str) {
        let mut args = rest.split_whitespace();
        match (args.next(), args.next()) {
            (None, _) => {
                let preferences = self.store.preferences();
                let role = self
                    .store
                    .role()
                    .map(Role::as_str)
                    .unwrap_or("signed out");
                println!("role: {role}");
                println!("theme: {}", preferences.theme.as_str());
                println!("font size: {}", preferences.font_size.as_str());
            }
            (Some("theme"), Some("light")) => self.store.set_theme(Theme::Light),
            (Some("theme"), Some("dark")) => self.store.set_theme(Theme::Dark),
            (Some("font"), Some("small")) => self.store.set_font_size(FontSize::Small),
            (Some("font"), Some("medium")) => self.store.set_font_size(FontSize::Medium),
            (Some("font"), Some("large")) => self.store.set_font_size(FontSize::Large),
            (Some("role"), Some("student")) => self.store.sign_in(Role::Student),
            (Some("role"), Some("instructor")) => self.store.sign_in(Role::Instructor),
            _ => println!(
                "Usage: settings [theme light|dark] [font small|medium|large] [role student|instructor]"
            ),
        }
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    fn require_instructor(&self) -> bool {
        if self.store.role() == Some(Role::Instructor) {
            true
        } else {
            println!("Only instructors can manage course materials.");
            false
        }
    }

    /// Resolves a 1-based module position from the command line.
    fn module_by_position(&self, raw: &str) -> Option<ModuleId> {
        let position = raw.parse::<usize>().ok().filter(|p| *p >= 1)?;
        self.store
            .modules()
            .get(position - 1)
            .map(|module: &Module| module.id.clone())
    }
}

fn print_help() {
    println!("Commands:");
    println!("  ask <question>                      ask the co-pilot about the course");
    println!("  history                             show the conversation log");
    println!("  clear                               clear the conversation log");
    println!("  modules                             list modules and materials");
    println!("  add-module [position]               add a module (instructor)");
    println!("  delete-module <n>                   delete a module (instructor)");
    println!("  upload <n> <file> [file...]         upload materials to module n (instructor)");
    println!("  delete-material <n> <filename>      delete a material (instructor)");
    println!("  view <n> <filename>                 show where a processed material is served");
    println!("  settings [...]                      show or change preferences");
    println!("  logout | quit");
}
