//! The interception registry — resolve a target, patch it, revert it.
//!
//! The registry is constructed from an injected [`PatchProvider`] and holds
//! no other state, so it can be exercised against fake modules and fake
//! providers in isolation. Beyond wiring descriptors to the provider it
//! hardens after handlers in two ways:
//!
//! - an `Err` from an after handler is logged and discarded at the wrapper
//!   seam; it never reaches the patched method's caller
//! - a per-patch entered flag stops an after handler from re-triggering
//!   itself when it re-enters the method it is attached to; the nested call
//!   runs the remaining chain only

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use modhub_bridge::locator::{self, ResolveStrategy};
use modhub_bridge::module::ModuleRef;

use crate::descriptor::{AfterFn, PatchAction, PatchDescriptor};
use crate::handle::{PatchHandle, PatchSet};
use crate::provider::PatchProvider;

/// Applies patch descriptors against resolved targets and hands out
/// reversal capabilities.
#[derive(Debug)]
pub struct InterceptRegistry {
    /// The injected patching primitive.
    provider: Arc<dyn PatchProvider>,
}

impl InterceptRegistry {
    /// Creates a registry over the given provider.
    pub fn new(provider: Arc<dyn PatchProvider>) -> Self {
        Self { provider }
    }

    /// Evaluates strategies in order and returns the first module produced.
    ///
    /// Short-circuits on the first hit; an all-miss is reported as `None`,
    /// never as an error, and leaves no state behind.
    pub fn resolve_target(&self, strategies: &[ResolveStrategy]) -> Option<ModuleRef> {
        let resolved = locator::resolve(strategies);
        match &resolved {
            Some(module) => debug!(module = %module.name(), "Resolved target module"),
            None => debug!(
                strategies = strategies.len(),
                "No resolve strategy produced a target module"
            ),
        }
        resolved
    }

    /// Applies one descriptor to the target.
    ///
    /// Probes for the member first: if the target does not expose it, no
    /// mutation happens and `None` comes back. The bridge's shape varies
    /// across host versions, so a missing member is an expected condition,
    /// not a failure.
    pub fn apply_patch(
        &self,
        target: &ModuleRef,
        descriptor: PatchDescriptor,
    ) -> Option<PatchHandle> {
        let PatchDescriptor { method, action } = descriptor;
        let mode = action.mode();

        if !target.has_callable(&method) {
            warn!(
                module = %target.name(),
                method = %method,
                "Target has no such callable member; skipping patch"
            );
            return None;
        }

        let applied = match action {
            PatchAction::Replace(handler) => self.provider.replace(target, &method, handler),
            PatchAction::After(handler) => {
                let guarded = guard_after(method.clone(), handler);
                self.provider.after(target, &method, guarded)
            }
        };

        match applied {
            Ok(undo) => {
                debug!(module = %target.name(), method = %method, mode = mode, "Patch applied");
                Some(PatchHandle::new(method, undo))
            }
            Err(e) => {
                warn!(
                    module = %target.name(),
                    method = %method,
                    error = %e,
                    "Provider rejected patch; skipping"
                );
                None
            }
        }
    }

    /// Applies a list of descriptors in order, collecting every handle.
    ///
    /// An absent target yields the empty set immediately. Descriptors whose
    /// member is missing are skipped without stopping the rest, so the set
    /// size can be smaller than the descriptor count.
    pub fn activate_all(
        &self,
        target: Option<ModuleRef>,
        descriptors: Vec<PatchDescriptor>,
    ) -> PatchSet {
        let Some(target) = target else {
            info!("No target module resolved; nothing to patch");
            return PatchSet::empty();
        };

        let requested = descriptors.len();
        let mut handles = Vec::with_capacity(requested);
        for descriptor in descriptors {
            if let Some(handle) = self.apply_patch(&target, descriptor) {
                handles.push(handle);
            }
        }

        info!(
            module = %target.name(),
            applied = handles.len(),
            requested = requested,
            "Patch activation complete"
        );
        PatchSet::new(handles)
    }

    /// Reverts every handle in the set.
    ///
    /// Safe to call any number of times; handles already restored are
    /// skipped individually.
    pub fn deactivate(&self, set: &PatchSet) {
        let live = set.live_count();
        set.restore_all();
        debug!(restored = live, total = set.len(), "Patch set deactivated");
    }
}

/// Wraps an after handler with containment and the re-entrancy guard.
fn guard_after(method: String, handler: Arc<AfterFn>) -> Arc<AfterFn> {
    let entered = Arc::new(AtomicBool::new(false));
    Arc::new(move |module, args, result| {
        if entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // Re-entered through the method it patches; let the nested call
            // run the rest of the chain without triggering this handler.
            return Ok(());
        }
        let outcome = handler(module, args, result);
        entered.store(false, Ordering::Release);
        if let Err(e) = outcome {
            warn!(
                module = %module.name(),
                method = %method,
                error = %e,
                "After handler failed; error contained"
            );
        }
        Ok(())
    })
}
