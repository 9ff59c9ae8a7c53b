//! Bridge modules — named objects exposing named callable members.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use modhub_core::error::HubError;
use modhub_core::result::HubResult;

/// Unique identifier for a bridge module instance.
///
/// Patches are keyed by module identity rather than module name, so two
/// modules registered under different names can never share patch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub Uuid);

impl ModuleId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an identifier from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Return a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ModuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signature of a callable member on a bridge module.
///
/// Members receive the owning module as an explicit receiver, so a member
/// (or a patch handler wrapped around one) can invoke other members on the
/// same module without holding a strong reference back to it.
pub type MethodFn = dyn Fn(&BridgeModule, &[Value]) -> HubResult<Value> + Send + Sync;

/// Shared reference to a bridge module.
pub type ModuleRef = Arc<BridgeModule>;

/// A named object exposing zero or more named callable members.
///
/// This is the Rust-side stand-in for a host application's native bridge
/// module: a bag of callables addressed by name, whose exact shape varies
/// across host versions. Callers probe for members explicitly via
/// [`BridgeModule::has_callable`] instead of assuming a fixed shape.
pub struct BridgeModule {
    /// Stable identity for patch bookkeeping.
    id: ModuleId,
    /// Module name as exported by the host.
    name: String,
    /// Member name → current implementation.
    methods: RwLock<HashMap<String, Arc<MethodFn>>>,
}

impl BridgeModule {
    /// Creates an empty module with the given exported name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ModuleId::new(),
            name: name.into(),
            methods: RwLock::new(HashMap::new()),
        }
    }

    /// Starts a builder for assembling a module fluently.
    pub fn builder(name: impl Into<String>) -> BridgeModuleBuilder {
        BridgeModuleBuilder {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// Returns the module's stable identity.
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Returns the module's exported name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the module currently exposes a callable member with
    /// this name.
    pub fn has_callable(&self, method: &str) -> bool {
        self.methods
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(method)
    }

    /// Returns the current implementation of a member, if present.
    pub fn member(&self, method: &str) -> Option<Arc<MethodFn>> {
        self.methods
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(method)
            .cloned()
    }

    /// Installs or swaps a member implementation, returning the previous one.
    pub fn set_member(&self, method: &str, f: Arc<MethodFn>) -> Option<Arc<MethodFn>> {
        self.methods
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(method.to_string(), f)
    }

    /// Names of all currently exposed members, sorted.
    pub fn member_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .methods
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Invokes a member by name.
    ///
    /// The member lock is released before the call runs, so a member may
    /// re-enter the module (including the member being invoked).
    pub fn call(&self, method: &str, args: &[Value]) -> HubResult<Value> {
        let f = self.member(method).ok_or_else(|| {
            HubError::not_found(format!("module '{}' has no member '{method}'", self.name))
        })?;
        f(self, args)
    }
}

impl fmt::Debug for BridgeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeModule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("members", &self.member_names())
            .finish()
    }
}

/// Builder for assembling a [`BridgeModule`] fluently.
pub struct BridgeModuleBuilder {
    /// Module name.
    name: String,
    /// Accumulated members.
    methods: HashMap<String, Arc<MethodFn>>,
}

impl BridgeModuleBuilder {
    /// Adds a member implementation.
    pub fn method(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&BridgeModule, &[Value]) -> HubResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Arc::new(f));
        self
    }

    /// Builds the final module.
    pub fn build(self) -> BridgeModule {
        BridgeModule {
            id: ModuleId::new(),
            name: self.name,
            methods: RwLock::new(self.methods),
        }
    }
}

impl fmt::Debug for BridgeModuleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeModuleBuilder")
            .field("name", &self.name)
            .field("members", &self.methods.len())
            .finish()
    }
}
