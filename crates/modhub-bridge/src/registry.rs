//! Registry of bridge modules exported by the host.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use modhub_core::error::HubError;
use modhub_core::result::HubResult;

use crate::module::ModuleRef;

/// Concurrent registry of bridge modules, keyed by exported name.
///
/// The registry only stores modules; resolving which module a tweak should
/// target is the job of [`crate::locator`] strategies layered on top.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    /// Exported name → module.
    modules: DashMap<String, ModuleRef>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
        }
    }

    /// Registers a module under its exported name.
    ///
    /// Rejects duplicates so a later registration can never silently shadow
    /// an earlier module that patches may already point at.
    pub fn register(&self, module: ModuleRef) -> HubResult<()> {
        let name = module.name().to_string();
        match self.modules.entry(name.clone()) {
            Entry::Occupied(_) => Err(HubError::conflict(format!(
                "module '{name}' is already registered"
            ))),
            Entry::Vacant(entry) => {
                entry.insert(module);
                info!(module = %name, "Registered bridge module");
                Ok(())
            }
        }
    }

    /// Removes a module by exported name.
    pub fn unregister(&self, name: &str) -> HubResult<ModuleRef> {
        match self.modules.remove(name) {
            Some((_, module)) => {
                info!(module = %name, "Unregistered bridge module");
                Ok(module)
            }
            None => Err(HubError::not_found(format!(
                "module '{name}' is not registered"
            ))),
        }
    }

    /// Looks up a module by exported name.
    pub fn get(&self, name: &str) -> Option<ModuleRef> {
        self.modules.get(name).map(|entry| entry.value().clone())
    }

    /// Returns the first module exposing all of the given members.
    ///
    /// Hosts rename modules across versions more often than they rename
    /// members, so shape-based lookup is the usual fallback when a name
    /// lookup misses.
    pub fn find_by_members<S: AsRef<str>>(&self, members: &[S]) -> Option<ModuleRef> {
        self.modules
            .iter()
            .find(|entry| {
                members
                    .iter()
                    .all(|member| entry.value().has_callable(member.as_ref()))
            })
            .map(|entry| entry.value().clone())
    }

    /// Returns whether a module with this exported name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Names of all registered modules, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .modules
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::BridgeModule;
    use serde_json::json;
    use std::sync::Arc;

    fn audio_module(name: &str) -> ModuleRef {
        Arc::new(
            BridgeModule::builder(name)
                .method("setMode", |_, _| Ok(json!(null)))
                .method("requestAudioFocus", |_, _| Ok(json!(1)))
                .build(),
        )
    }

    #[test]
    fn test_register_and_get() {
        let registry = ModuleRegistry::new();
        registry.register(audio_module("AudioManager")).unwrap();

        assert!(registry.contains("AudioManager"));
        assert_eq!(registry.len(), 1);
        let module = registry.get("AudioManager").expect("module present");
        assert_eq!(module.name(), "AudioManager");
    }

    #[test]
    fn test_duplicate_registration_is_conflict() {
        let registry = ModuleRegistry::new();
        registry.register(audio_module("AudioManager")).unwrap();

        let err = registry.register(audio_module("AudioManager")).unwrap_err();
        assert_eq!(err.kind, modhub_core::error::ErrorKind::Conflict);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_find_by_members_matches_shape() {
        let registry = ModuleRegistry::new();
        registry.register(audio_module("RTNAudioManager")).unwrap();
        registry
            .register(Arc::new(
                BridgeModule::builder("Clipboard")
                    .method("getString", |_, _| Ok(json!("")))
                    .build(),
            ))
            .unwrap();

        let module = registry
            .find_by_members(&["setMode", "requestAudioFocus"])
            .expect("shape match");
        assert_eq!(module.name(), "RTNAudioManager");

        assert!(registry.find_by_members(&["setMode", "missing"]).is_none());
    }

    #[test]
    fn test_unregister_removes_module() {
        let registry = ModuleRegistry::new();
        registry.register(audio_module("AudioManager")).unwrap();
        registry.unregister("AudioManager").unwrap();

        assert!(registry.get("AudioManager").is_none());
        let err = registry.unregister("AudioManager").unwrap_err();
        assert_eq!(err.kind, modhub_core::error::ErrorKind::NotFound);
    }
}
