//! The tweak trait and its metadata types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use modhub_bridge::locator::ResolveStrategy;
use modhub_bridge::registry::ModuleRegistry;
use modhub_patch::descriptor::PatchDescriptor;

/// Metadata about a tweak.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweakInfo {
    /// Unique tweak identifier.
    pub id: String,
    /// Human-readable tweak name.
    pub name: String,
    /// Tweak version string.
    pub version: String,
    /// Tweak description.
    pub description: String,
    /// Author or maintainer.
    pub author: String,
    /// Member names this tweak intends to patch.
    pub patches: Vec<String>,
}

/// Trait that all tweaks must implement.
///
/// A tweak is declarative: it names where its target lives (ordered
/// resolution strategies) and what to do to it (patch descriptors). The
/// [`TweakManager`](crate::manager::TweakManager) owns the mechanics of
/// applying and reversing those descriptors.
#[async_trait::async_trait]
pub trait Tweak: Send + Sync + std::fmt::Debug {
    /// Returns tweak metadata.
    fn info(&self) -> TweakInfo;

    /// Returns the resolution strategies locating the target module, in
    /// priority order.
    fn strategies(&self, modules: &Arc<ModuleRegistry>) -> Vec<ResolveStrategy>;

    /// Returns the patches to apply, in application order.
    fn descriptors(&self) -> Vec<PatchDescriptor>;

    /// Called once before the tweak's patches are activated.
    async fn on_load(&self) -> Result<(), String>;

    /// Called after the tweak's patches have been reverted on unload.
    async fn on_unload(&self) -> Result<(), String>;
}

/// Point-in-time view of one loaded tweak.
#[derive(Debug, Clone, Serialize)]
pub struct TweakStatus {
    /// The tweak's metadata.
    pub info: TweakInfo,
    /// Patches applied during activation and not yet restored.
    pub live_patches: usize,
    /// When the tweak was loaded.
    pub loaded_at: DateTime<Utc>,
}
