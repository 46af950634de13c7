//! crates/copilot_core/src/store.rs
//!
//! The single application-state object: the ordered module list with derived
//! titles, the conversation log, display preferences, and the signed-in role.
//! All mutation goes through the typed operations here; nothing else holds
//! course state.

use chrono::Utc;

use crate::domain::{
    format_size, ChatEntry, Citation, FontSize, Material, MaterialId, MaterialStatus, Module,
    ModuleId, Preferences, Role, Theme, UploadToken,
};

/// How one upload attempt ended.
#[derive(Debug, Clone)]
pub enum UploadResolution {
    /// The backend accepted the file; `id` is the server-assigned identifier.
    Completed { id: MaterialId },
    /// The upload failed; the message stays visible on the record.
    Failed { message: String },
}

#[derive(Debug, Default)]
pub struct CourseStore {
    modules: Vec<Module>,
    conversation: Vec<ChatEntry>,
    preferences: Preferences,
    role: Option<Role>,
}

impl CourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    //=====================================================================================
    // Modules
    //=====================================================================================

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.iter().find(|module| &module.id == id)
    }

    /// Adds an empty module, inserted before `at` when it is within bounds,
    /// otherwise appended. Always succeeds locally.
    pub fn add_module(&mut self, at: Option<usize>) -> ModuleId {
        let id = ModuleId::generate();
        let module = Module {
            id: id.clone(),
            title: String::new(),
            materials: Vec::new(),
        };
        match at {
            Some(index) if index <= self.modules.len() => self.modules.insert(index, module),
            _ => self.modules.push(module),
        }
        self.renumber();
        id
    }

    /// Removes the module with the given id, discarding its materials.
    /// Deleting an unknown id is a no-op.
    pub fn delete_module(&mut self, id: &ModuleId) -> bool {
        let before = self.modules.len();
        self.modules.retain(|module| &module.id != id);
        let removed = self.modules.len() != before;
        if removed {
            self.renumber();
        }
        removed
    }

    /// Replaces the whole module list with the tree fetched from the
    /// catalog. Server titles are overwritten by renumbering.
    pub fn replace_catalog(&mut self, modules: Vec<Module>) {
        self.modules = modules;
        self.renumber();
    }

    /// Titles are a bijection with position: `Module N` for the 1-based
    /// index, recomputed after every mutation.
    fn renumber(&mut self) {
        for (index, module) in self.modules.iter_mut().enumerate() {
            module.title = format!("Module {}", index + 1);
        }
    }

    //=====================================================================================
    // Materials
    //=====================================================================================

    /// Inserts the `uploading` placeholder for a file and returns the
    /// correlation token for the attempt. A filename appears at most once
    /// per module: re-uploading replaces the existing record in place.
    /// Returns `None` when the module does not exist.
    pub fn begin_upload(
        &mut self,
        module_id: &ModuleId,
        name: &str,
        size_bytes: u64,
    ) -> Option<UploadToken> {
        let module = self.modules.iter_mut().find(|m| &m.id == module_id)?;
        let token = UploadToken::generate();
        let material = Material {
            id: MaterialId::placeholder(token),
            token: Some(token),
            name: name.to_string(),
            size: format_size(size_bytes),
            upload_date: Utc::now().date_naive(),
            status: MaterialStatus::Uploading,
            error: None,
        };
        match module.materials.iter_mut().find(|m| m.name == name) {
            Some(existing) => *existing = material,
            None => module.materials.push(material),
        }
        Some(token)
    }

    /// Swaps the placeholder matched by `token` for its final state. The
    /// status label only moves forward; a resolution that would move it
    /// backwards (or a token no longer present) is ignored.
    pub fn resolve_upload(
        &mut self,
        module_id: &ModuleId,
        token: UploadToken,
        resolution: UploadResolution,
    ) -> bool {
        let Some(module) = self.modules.iter_mut().find(|m| &m.id == module_id) else {
            return false;
        };
        let Some(material) = module
            .materials
            .iter_mut()
            .find(|m| m.token == Some(token))
        else {
            return false;
        };
        match resolution {
            UploadResolution::Completed { id } => {
                if !material.status.can_become(MaterialStatus::Processed) {
                    return false;
                }
                material.id = id;
                material.status = MaterialStatus::Processed;
                material.error = None;
            }
            UploadResolution::Failed { message } => {
                if !material.status.can_become(MaterialStatus::Error) {
                    return false;
                }
                material.status = MaterialStatus::Error;
                material.error = Some(message);
            }
        }
        material.token = None;
        true
    }

    /// Removes one material from a module. No-op on unknown ids.
    pub fn delete_material(&mut self, module_id: &ModuleId, material_id: &MaterialId) -> bool {
        let Some(module) = self.modules.iter_mut().find(|m| &m.id == module_id) else {
            return false;
        };
        let before = module.materials.len();
        module.materials.retain(|m| &m.id != material_id);
        module.materials.len() != before
    }

    //=====================================================================================
    // Conversation
    //=====================================================================================

    pub fn conversation(&self) -> &[ChatEntry] {
        &self.conversation
    }

    /// Appends one question/answer exchange, question first. The log only
    /// ever grows; a failed exchange appends nothing.
    pub fn record_exchange(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
        citations: Vec<Citation>,
    ) {
        let now = Utc::now();
        self.conversation.push(ChatEntry::Question {
            text: question.into(),
            asked_at: now,
        });
        self.conversation.push(ChatEntry::Answer {
            text: answer.into(),
            citations,
            answered_at: now,
        });
    }

    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
    }

    //=====================================================================================
    // Preferences and role
    //=====================================================================================

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.preferences.theme = theme;
    }

    pub fn set_font_size(&mut self, font_size: FontSize) {
        self.preferences.font_size = font_size;
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn sign_in(&mut self, role: Role) {
        self.role = Some(role);
    }

    pub fn sign_out(&mut self) {
        self.role = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(store: &CourseStore) -> Vec<String> {
        store.modules().iter().map(|m| m.title.clone()).collect()
    }

    fn assert_sequential_titles(store: &CourseStore) {
        for (index, module) in store.modules().iter().enumerate() {
            assert_eq!(module.title, format!("Module {}", index + 1));
        }
    }

    #[test]
    fn appending_modules_numbers_them_in_order() {
        let mut store = CourseStore::new();
        store.add_module(None);
        store.add_module(None);
        assert_eq!(titles(&store), vec!["Module 1", "Module 2"]);
    }

    #[test]
    fn deleting_the_first_module_retitles_the_rest() {
        let mut store = CourseStore::new();
        let first = store.add_module(None);
        store.add_module(None);
        assert!(store.delete_module(&first));
        assert_eq!(titles(&store), vec!["Module 1"]);
    }

    #[test]
    fn titles_stay_sequential_across_arbitrary_edits() {
        let mut store = CourseStore::new();
        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(store.add_module(None));
            assert_sequential_titles(&store);
        }
        store.add_module(Some(0));
        assert_sequential_titles(&store);
        store.add_module(Some(2));
        assert_sequential_titles(&store);
        assert!(store.delete_module(&ids[1]));
        assert_sequential_titles(&store);
        assert!(store.delete_module(&ids[3]));
        assert_sequential_titles(&store);
        assert_eq!(store.modules().len(), 4);
    }

    #[test]
    fn inserting_out_of_bounds_appends() {
        let mut store = CourseStore::new();
        store.add_module(None);
        let id = store.add_module(Some(42));
        assert_eq!(store.modules().last().unwrap().id, id);
        assert_sequential_titles(&store);
    }

    #[test]
    fn deleting_an_unknown_module_is_a_no_op() {
        let mut store = CourseStore::new();
        store.add_module(None);
        assert!(!store.delete_module(&ModuleId("missing".into())));
        assert_eq!(store.modules().len(), 1);
    }

    #[test]
    fn deleting_a_module_cascades_only_its_own_materials() {
        let mut store = CourseStore::new();
        let first = store.add_module(None);
        let second = store.add_module(None);
        store.begin_upload(&first, "syllabus.pdf", 1024).unwrap();
        store.begin_upload(&second, "week2.pptx", 2048).unwrap();
        assert!(store.delete_module(&first));
        assert_eq!(store.modules().len(), 1);
        let survivor = &store.modules()[0];
        assert_eq!(survivor.title, "Module 1");
        assert_eq!(survivor.materials.len(), 1);
        assert_eq!(survivor.materials[0].name, "week2.pptx");
    }

    #[test]
    fn replace_catalog_overwrites_server_titles() {
        let mut store = CourseStore::new();
        store.replace_catalog(vec![
            Module {
                id: ModuleId("srv-1".into()),
                title: "Week 1".into(),
                materials: Vec::new(),
            },
            Module {
                id: ModuleId("srv-2".into()),
                title: "Week 2".into(),
                materials: Vec::new(),
            },
        ]);
        assert_eq!(titles(&store), vec!["Module 1", "Module 2"]);
    }

    #[test]
    fn begin_upload_inserts_an_uploading_placeholder() {
        let mut store = CourseStore::new();
        let module = store.add_module(None);
        store
            .begin_upload(&module, "syllabus.pdf", 5 * 1024 * 1024)
            .unwrap();
        let material = &store.module(&module).unwrap().materials[0];
        assert_eq!(material.name, "syllabus.pdf");
        assert_eq!(material.size, "5 MB");
        assert_eq!(material.status, MaterialStatus::Uploading);
        assert!(material.token.is_some());
    }

    #[test]
    fn begin_upload_replaces_a_matching_filename_in_place() {
        let mut store = CourseStore::new();
        let module = store.add_module(None);
        let first = store.begin_upload(&module, "a.pdf", 10).unwrap();
        store.begin_upload(&module, "b.pdf", 10).unwrap();
        store.resolve_upload(
            &module,
            first,
            UploadResolution::Completed {
                id: MaterialId("srv-a".into()),
            },
        );

        let again = store.begin_upload(&module, "a.pdf", 20).unwrap();
        let materials = &store.module(&module).unwrap().materials;
        assert_eq!(materials.len(), 2);
        // Same slot, fresh attempt.
        assert_eq!(materials[0].name, "a.pdf");
        assert_eq!(materials[0].status, MaterialStatus::Uploading);
        assert_eq!(materials[0].token, Some(again));
    }

    #[test]
    fn begin_upload_requires_an_existing_module() {
        let mut store = CourseStore::new();
        assert!(store
            .begin_upload(&ModuleId("missing".into()), "a.pdf", 10)
            .is_none());
    }

    #[test]
    fn a_completed_upload_swaps_the_server_id_and_keeps_the_name() {
        let mut store = CourseStore::new();
        let module = store.add_module(None);
        let token = store.begin_upload(&module, "syllabus.pdf", 1024).unwrap();
        assert!(store.resolve_upload(
            &module,
            token,
            UploadResolution::Completed {
                id: MaterialId("doc-17".into()),
            },
        ));
        let material = &store.module(&module).unwrap().materials[0];
        assert_eq!(material.id, MaterialId("doc-17".into()));
        assert_eq!(material.name, "syllabus.pdf");
        assert_eq!(material.status, MaterialStatus::Processed);
        assert!(material.token.is_none());
        assert!(material.error.is_none());
    }

    #[test]
    fn a_failed_upload_keeps_the_record_with_the_message() {
        let mut store = CourseStore::new();
        let module = store.add_module(None);
        let token = store.begin_upload(&module, "syllabus.pdf", 1024).unwrap();
        assert!(store.resolve_upload(
            &module,
            token,
            UploadResolution::Failed {
                message: "Failed to upload syllabus.pdf. server exploded".into(),
            },
        ));
        let material = &store.module(&module).unwrap().materials[0];
        assert_eq!(material.status, MaterialStatus::Error);
        assert!(material.error.as_deref().unwrap().contains("syllabus.pdf"));
    }

    #[test]
    fn a_resolved_upload_cannot_be_resolved_again() {
        let mut store = CourseStore::new();
        let module = store.add_module(None);
        let token = store.begin_upload(&module, "syllabus.pdf", 1024).unwrap();
        store.resolve_upload(
            &module,
            token,
            UploadResolution::Completed {
                id: MaterialId("doc-1".into()),
            },
        );
        assert!(!store.resolve_upload(
            &module,
            token,
            UploadResolution::Failed {
                message: "late failure".into(),
            },
        ));
        let material = &store.module(&module).unwrap().materials[0];
        assert_eq!(material.status, MaterialStatus::Processed);
    }

    #[test]
    fn delete_material_removes_exactly_one_record() {
        let mut store = CourseStore::new();
        let module = store.add_module(None);
        store.begin_upload(&module, "a.pdf", 10).unwrap();
        store.begin_upload(&module, "b.pdf", 10).unwrap();
        let id = store.module(&module).unwrap().materials[0].id.clone();
        assert!(store.delete_material(&module, &id));
        assert!(!store.delete_material(&module, &id));
        let materials = &store.module(&module).unwrap().materials;
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].name, "b.pdf");
    }

    #[test]
    fn exchanges_append_question_then_answer() {
        let mut store = CourseStore::new();
        store.record_exchange("What is week 2 about?", "Recursion.", Vec::new());
        let log = store.conversation();
        assert_eq!(log.len(), 2);
        assert!(matches!(&log[0], ChatEntry::Question { text, .. } if text == "What is week 2 about?"));
        assert!(matches!(&log[1], ChatEntry::Answer { text, .. } if text == "Recursion."));

        store.record_exchange("Another?", "Yes.", Vec::new());
        assert_eq!(store.conversation().len(), 4);
        store.clear_conversation();
        assert!(store.conversation().is_empty());
    }
}
