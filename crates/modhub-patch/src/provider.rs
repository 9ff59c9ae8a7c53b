//! The patch provider seam.
//!
//! The [`InterceptRegistry`](crate::registry::InterceptRegistry) never
//! mutates a module itself; it goes through a [`PatchProvider`]. The only
//! contract a provider owes the registry is that each returned [`UndoFn`]
//! takes no arguments and is safe to call once — idempotence and failure
//! containment are layered on top by the registry.

use std::fmt;
use std::sync::Arc;

use modhub_bridge::module::ModuleRef;
use modhub_core::result::HubResult;

use crate::descriptor::{AfterFn, ReplaceFn};
use crate::handle::UndoFn;

/// Applies and reverts method patches against a bridge module.
pub trait PatchProvider: Send + Sync + fmt::Debug {
    /// Installs a replacement for `method` on `target`. The returned undo
    /// action puts the member back to its pre-patch state.
    fn replace(
        &self,
        target: &ModuleRef,
        method: &str,
        handler: Arc<ReplaceFn>,
    ) -> HubResult<UndoFn>;

    /// Installs an observer that runs after `method` on `target` has
    /// returned successfully. The returned undo action removes the observer.
    fn after(
        &self,
        target: &ModuleRef,
        method: &str,
        handler: Arc<AfterFn>,
    ) -> HubResult<UndoFn>;
}
