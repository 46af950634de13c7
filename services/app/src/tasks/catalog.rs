//! services/app/src/tasks/catalog.rs
//!
//! Initial catalog population and the confirmation-gated destructive
//! actions on the module tree.

use tracing::info;

use copilot_core::domain::{MaterialId, ModuleId};
use copilot_core::ports::{ConfirmationGate, CourseCatalog, PortResult};
use copilot_core::store::CourseStore;

pub const DELETE_MODULE_PROMPT: &str =
    "Are you sure you want to delete this module and all its materials? This action cannot be undone.";
pub const DELETE_MATERIAL_PROMPT: &str = "Are you sure you want to delete this material?";

/// Fetches the module tree and replaces the store's contents with it.
/// Returns the number of modules loaded.
pub async fn load_catalog(
    store: &mut CourseStore,
    catalog: &dyn CourseCatalog,
) -> PortResult<usize> {
    let modules = catalog.fetch_modules().await?;
    let count = modules.len();
    store.replace_catalog(modules);
    info!(modules = count, "catalog loaded");
    Ok(count)
}

/// Deletes a module and everything in it, if the user confirms. Declining
/// drops the action silently.
pub async fn delete_module(
    store: &mut CourseStore,
    gate: &dyn ConfirmationGate,
    id: &ModuleId,
) -> bool {
    if !gate.confirm(DELETE_MODULE_PROMPT).await {
        return false;
    }
    store.delete_module(id)
}

/// Deletes one material, if the user confirms.
pub async fn delete_material(
    store: &mut CourseStore,
    gate: &dyn ConfirmationGate,
    module_id: &ModuleId,
    material_id: &MaterialId,
) -> bool {
    if !gate.confirm(DELETE_MATERIAL_PROMPT).await {
        return false;
    }
    store.delete_material(module_id, material_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use copilot_core::domain::Module;
    use copilot_core::ports::PortError;

    struct TestCatalog {
        modules: Vec<Module>,
        fail: bool,
    }

    #[async_trait]
    impl CourseCatalog for TestCatalog {
        async fn fetch_modules(&self) -> PortResult<Vec<Module>> {
            if self.fail {
                return Err(PortError::Rejected("catalog offline".into()));
            }
            Ok(self.modules.clone())
        }

        fn material_url(&self, filename: &str) -> String {
            format!("http://test/uploads/{filename}")
        }
    }

    /// Answers every prompt with a preset value and records the prompts.
    struct TestGate {
        accept: bool,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl TestGate {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ConfirmationGate for TestGate {
        async fn confirm(&self, prompt: &str) -> bool {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.accept
        }
    }

    #[tokio::test]
    async fn load_catalog_replaces_and_renumbers() {
        let mut store = CourseStore::new();
        store.add_module(None);
        let catalog = TestCatalog {
            modules: vec![Module {
                id: ModuleId("srv-9".into()),
                title: "Week 9".into(),
                materials: Vec::new(),
            }],
            fail: false,
        };
        assert_eq!(load_catalog(&mut store, &catalog).await.unwrap(), 1);
        assert_eq!(store.modules()[0].title, "Module 1");
        assert_eq!(store.modules()[0].id, ModuleId("srv-9".into()));
    }

    #[tokio::test]
    async fn load_catalog_failure_leaves_the_store_alone() {
        let mut store = CourseStore::new();
        store.add_module(None);
        let catalog = TestCatalog {
            modules: Vec::new(),
            fail: true,
        };
        assert!(load_catalog(&mut store, &catalog).await.is_err());
        assert_eq!(store.modules().len(), 1);
    }

    #[tokio::test]
    async fn declining_the_prompt_drops_the_delete() {
        let mut store = CourseStore::new();
        let id = store.add_module(None);
        let gate = TestGate::new(false);
        assert!(!delete_module(&mut store, &gate, &id).await);
        assert_eq!(store.modules().len(), 1);
        assert_eq!(
            gate.prompts.lock().unwrap().as_slice(),
            &[DELETE_MODULE_PROMPT.to_string()]
        );
    }

    #[tokio::test]
    async fn confirming_the_prompt_deletes_module_and_material() {
        let mut store = CourseStore::new();
        let id = store.add_module(None);
        store.begin_upload(&id, "a.pdf", 10).unwrap();
        let material_id = store.module(&id).unwrap().materials[0].id.clone();
        let gate = TestGate::new(true);

        assert!(delete_material(&mut store, &gate, &id, &material_id).await);
        assert!(store.module(&id).unwrap().materials.is_empty());
        assert!(delete_module(&mut store, &gate, &id).await);
        assert!(store.modules().is_empty());
    }
}
