//! Default patch provider over bridge-module method tables.
//!
//! Patches on one member form a **chain**: the original implementation is
//! captured once, a dispatcher is installed in the member slot, and every
//! patch becomes a layer in the chain. Dispatch runs the topmost replace
//! layer (or the original when none is live) and then the after layers
//! stacked above it. Undoing a patch removes only its own layer, so handles
//! can be restored in any order without clobbering each other; removing the
//! last layer puts the captured original back into the slot.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use tracing::{debug, error, warn};

use modhub_bridge::module::{BridgeModule, MethodFn, ModuleId, ModuleRef};
use modhub_core::error::HubError;
use modhub_core::result::HubResult;

use crate::descriptor::{AfterFn, ReplaceFn};
use crate::handle::UndoFn;
use crate::provider::PatchProvider;

/// Chains are keyed by module identity plus member name, never by module
/// name, so same-named modules cannot share patch state.
type ChainKey = (ModuleId, String);

/// One applied patch within a chain.
#[derive(Clone)]
enum Layer {
    Replace {
        id: u64,
        handler: Arc<ReplaceFn>,
    },
    After {
        id: u64,
        handler: Arc<AfterFn>,
    },
}

impl Layer {
    fn id(&self) -> u64 {
        match self {
            Self::Replace { id, .. } | Self::After { id, .. } => *id,
        }
    }
}

/// Live patch state for one member slot.
struct PatchChain {
    /// The pre-patch implementation, restored when the chain empties.
    original: Arc<MethodFn>,
    /// The closure currently installed in the slot, kept for identity checks.
    dispatcher: Arc<MethodFn>,
    /// Layers in application order.
    layers: Vec<Layer>,
}

/// [`PatchProvider`] that rewires [`BridgeModule`] method tables in place.
pub struct TablePatchProvider {
    /// Chain state shared with every installed dispatcher.
    chains: Arc<DashMap<ChainKey, PatchChain>>,
    /// Monotonic layer id source.
    next_layer: AtomicU64,
}

impl TablePatchProvider {
    /// Creates a provider with no live patches.
    pub fn new() -> Self {
        Self {
            chains: Arc::new(DashMap::new()),
            next_layer: AtomicU64::new(0),
        }
    }

    /// Number of member slots currently carrying at least one patch.
    pub fn patched_slots(&self) -> usize {
        self.chains.len()
    }

    /// Adds a layer to the chain for `(target, method)`, creating the chain
    /// and installing the dispatcher on first patch.
    fn install(&self, target: &ModuleRef, method: &str, layer: Layer) -> HubResult<UndoFn> {
        let key: ChainKey = (target.id(), method.to_string());
        let layer_id = layer.id();

        match self.chains.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().layers.push(layer);
            }
            Entry::Vacant(entry) => {
                let original = target.member(method).ok_or_else(|| {
                    HubError::patch(format!(
                        "module '{}' has no member '{method}' to patch",
                        target.name()
                    ))
                })?;
                let dispatcher =
                    make_dispatcher(Arc::clone(&self.chains), key.clone(), Arc::clone(&original));
                let chain_guard = entry.insert(PatchChain {
                    original,
                    dispatcher: Arc::clone(&dispatcher),
                    layers: vec![layer],
                });
                // Hold the entry lock across the slot swap so another install
                // on this member cannot observe the chain before the
                // dispatcher is live.
                target.set_member(method, dispatcher);
                drop(chain_guard);
            }
        }

        debug!(
            module = %target.name(),
            method = %method,
            layer = layer_id,
            "Patch layer installed"
        );

        let chains = Arc::clone(&self.chains);
        let target = Arc::clone(target);
        let method = method.to_string();
        Ok(Box::new(move || {
            remove_layer(&chains, &target, &method, layer_id);
        }))
    }
}

impl Default for TablePatchProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TablePatchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TablePatchProvider")
            .field("patched_slots", &self.chains.len())
            .finish()
    }
}

impl PatchProvider for TablePatchProvider {
    fn replace(
        &self,
        target: &ModuleRef,
        method: &str,
        handler: Arc<ReplaceFn>,
    ) -> HubResult<UndoFn> {
        let id = self.next_layer.fetch_add(1, Ordering::Relaxed);
        self.install(target, method, Layer::Replace { id, handler })
    }

    fn after(
        &self,
        target: &ModuleRef,
        method: &str,
        handler: Arc<AfterFn>,
    ) -> HubResult<UndoFn> {
        let id = self.next_layer.fetch_add(1, Ordering::Relaxed);
        self.install(target, method, Layer::After { id, handler })
    }
}

/// Builds the closure installed in a patched member slot.
///
/// The chain is looked up on every call, so layers added or removed after
/// installation take effect immediately. `fallback` is the captured original
/// for the window where the chain entry is already gone but the dispatcher
/// is still reachable.
fn make_dispatcher(
    chains: Arc<DashMap<ChainKey, PatchChain>>,
    key: ChainKey,
    fallback: Arc<MethodFn>,
) -> Arc<MethodFn> {
    Arc::new(move |module: &BridgeModule, args: &[Value]| -> HubResult<Value> {
        // Snapshot under the map guard, execute outside it, so handlers may
        // re-enter the module and the chain freely.
        let snapshot = chains
            .get(&key)
            .map(|chain| (Arc::clone(&chain.original), chain.layers.clone()));
        let Some((original, layers)) = snapshot else {
            return fallback(module, args);
        };

        let top_replace = layers.iter().enumerate().rev().find_map(|(i, layer)| {
            match layer {
                Layer::Replace { handler, .. } => Some((i, Arc::clone(handler))),
                Layer::After { .. } => None,
            }
        });

        let (first_after, result) = match top_replace {
            Some((index, handler)) => (index + 1, handler(module, args)),
            None => (0, original(module, args)),
        };
        let result = result?;

        for layer in &layers[first_after..] {
            if let Layer::After { handler, .. } = layer {
                if let Err(e) = handler(module, args, &result) {
                    warn!(
                        module = %module.name(),
                        method = %key.1,
                        error = %e,
                        "After layer failed; call result unaffected"
                    );
                }
            }
        }

        Ok(result)
    })
}

/// Undo path: drops exactly one layer, restoring the original into the slot
/// when the chain empties.
fn remove_layer(
    chains: &DashMap<ChainKey, PatchChain>,
    target: &ModuleRef,
    method: &str,
    layer_id: u64,
) {
    let key: ChainKey = (target.id(), method.to_string());

    let emptied = {
        let Some(mut chain) = chains.get_mut(&key) else {
            return;
        };
        chain.layers.retain(|layer| layer.id() != layer_id);
        if chain.layers.is_empty() {
            Some((Arc::clone(&chain.dispatcher), Arc::clone(&chain.original)))
        } else {
            None
        }
    };

    debug!(
        module = %target.name(),
        method = %method,
        layer = layer_id,
        "Patch layer removed"
    );

    let Some((dispatcher, original)) = emptied else {
        return;
    };

    if chains.remove_if(&key, |_, chain| chain.layers.is_empty()).is_none() {
        // A new layer arrived before the chain could be torn down; the
        // dispatcher stays in the slot.
        return;
    }

    match target.member(method) {
        Some(current) if Arc::ptr_eq(&current, &dispatcher) => {
            target.set_member(method, original);
            debug!(module = %target.name(), method = %method, "Original member restored");
        }
        _ => {
            error!(
                module = %target.name(),
                method = %method,
                "Member slot was replaced outside the patch table; leaving it as found"
            );
        }
    }
}
