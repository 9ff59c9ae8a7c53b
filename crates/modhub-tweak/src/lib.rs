//! # modhub-tweak
//!
//! Tweak SDK and lifecycle management for ModHub. Provides:
//!
//! - The [`Tweak`] trait tweak authors implement: metadata, target
//!   resolution strategies, patch descriptors, load/unload hooks
//! - [`TweakManager`]: loads a tweak, resolves its target, activates its
//!   patches, and reverses exactly that tweak's patches on unload
//! - Optional dynamic loading via `libloading` (behind the `dynamic`
//!   feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use modhub_tweak::prelude::*;
//!
//! #[derive(Debug)]
//! struct Quiet;
//!
//! #[async_trait]
//! impl Tweak for Quiet {
//!     fn info(&self) -> TweakInfo {
//!         tweak_info!(
//!             id: "quiet",
//!             name: "Quiet",
//!             version: "1.0.0",
//!             description: "Silences a noisy bridge member",
//!             author: "Developer"
//!         )
//!     }
//!
//!     fn strategies(&self, modules: &Arc<ModuleRegistry>) -> Vec<ResolveStrategy> {
//!         vec![locator::by_name(modules, "NoiseModule")]
//!     }
//!
//!     fn descriptors(&self) -> Vec<PatchDescriptor> {
//!         vec![PatchDescriptor::replace("beep", |_, _| Ok(Value::Null))]
//!     }
//!
//!     async fn on_load(&self) -> Result<(), String> { Ok(()) }
//!     async fn on_unload(&self) -> Result<(), String> { Ok(()) }
//! }
//! ```

pub mod loader;
pub mod macros;
pub mod manager;
pub mod tweak;

pub use loader::DynamicLoader;
pub use manager::TweakManager;
pub use tweak::{Tweak, TweakInfo, TweakStatus};

/// Prelude for convenient imports in tweak crates.
pub mod prelude {
    pub use std::sync::Arc;

    pub use async_trait::async_trait;
    pub use serde_json::Value;

    pub use modhub_bridge::locator::{self, ResolveStrategy};
    pub use modhub_bridge::module::{BridgeModule, ModuleRef};
    pub use modhub_bridge::registry::ModuleRegistry;
    pub use modhub_core::error::HubError;
    pub use modhub_core::result::HubResult;
    pub use modhub_patch::descriptor::{PatchAction, PatchDescriptor};

    pub use crate::manager::TweakManager;
    pub use crate::tweak::{Tweak, TweakInfo, TweakStatus};
    pub use crate::tweak_info;
}
