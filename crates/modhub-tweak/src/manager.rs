//! Tweak manager — lifecycle management for all tweaks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use modhub_bridge::registry::ModuleRegistry;
use modhub_core::error::HubError;
use modhub_core::result::HubResult;
use modhub_patch::handle::PatchSet;
use modhub_patch::provider::PatchProvider;
use modhub_patch::registry::InterceptRegistry;

use crate::tweak::{Tweak, TweakStatus};

/// A tweak together with the patch set its activation produced.
#[derive(Debug)]
struct LoadedTweak {
    /// The tweak instance.
    tweak: Arc<dyn Tweak>,
    /// Handles from this tweak's activation only.
    patches: PatchSet,
    /// Load timestamp.
    loaded_at: DateTime<Utc>,
}

/// Manages the full lifecycle of tweaks: load, activate, deactivate, unload.
///
/// Deactivation is scoped: unloading a tweak reverts the patch set produced
/// by that tweak's activation and nothing else. Patches applied by other
/// tweaks, even on the same members, stay live.
#[derive(Debug)]
pub struct TweakManager {
    /// The host's bridge modules.
    modules: Arc<ModuleRegistry>,
    /// Interception registry all tweaks go through.
    intercept: InterceptRegistry,
    /// Tweak ID → loaded state.
    tweaks: RwLock<HashMap<String, LoadedTweak>>,
}

impl TweakManager {
    /// Creates a manager over the given module registry and patch provider.
    pub fn new(modules: Arc<ModuleRegistry>, provider: Arc<dyn PatchProvider>) -> Self {
        Self {
            modules,
            intercept: InterceptRegistry::new(provider),
            tweaks: RwLock::new(HashMap::new()),
        }
    }

    /// Loads a tweak: runs `on_load`, resolves its target, and activates its
    /// descriptors.
    ///
    /// A target that fails to resolve is not an error; the tweak is recorded
    /// with an empty patch set and unloads cleanly.
    pub async fn load_tweak(&self, tweak: Arc<dyn Tweak>) -> HubResult<()> {
        let info = tweak.info();
        let tweak_id = info.id.clone();

        if self.tweaks.read().await.contains_key(&tweak_id) {
            return Err(HubError::conflict(format!(
                "tweak '{tweak_id}' is already loaded"
            )));
        }

        tweak
            .on_load()
            .await
            .map_err(|e| HubError::tweak(format!("tweak '{tweak_id}' load failed: {e}")))?;

        let strategies = tweak.strategies(&self.modules);
        let target = self.intercept.resolve_target(&strategies);
        let patches = self.intercept.activate_all(target, tweak.descriptors());

        let mut tweaks = self.tweaks.write().await;
        if tweaks.contains_key(&tweak_id) {
            // Lost a load race for the same id; back out our own patches.
            self.intercept.deactivate(&patches);
            return Err(HubError::conflict(format!(
                "tweak '{tweak_id}' is already loaded"
            )));
        }

        info!(
            tweak_id = %tweak_id,
            name = %info.name,
            version = %info.version,
            patches = patches.len(),
            "Tweak loaded"
        );

        tweaks.insert(
            tweak_id,
            LoadedTweak {
                tweak,
                patches,
                loaded_at: Utc::now(),
            },
        );

        Ok(())
    }

    /// Unloads a tweak: reverts its own patch set, then runs `on_unload`.
    pub async fn unload_tweak(&self, tweak_id: &str) -> HubResult<()> {
        let loaded = self
            .tweaks
            .write()
            .await
            .remove(tweak_id)
            .ok_or_else(|| HubError::not_found(format!("tweak '{tweak_id}' is not loaded")))?;

        self.intercept.deactivate(&loaded.patches);

        if let Err(e) = loaded.tweak.on_unload().await {
            warn!(
                tweak_id = %tweak_id,
                error = %e,
                "Tweak unload hook returned error"
            );
        }

        info!(tweak_id = %tweak_id, "Tweak unloaded");

        Ok(())
    }

    /// Unloads all tweaks, most recently loaded first.
    pub async fn unload_all(&self) {
        let mut ids: Vec<(String, DateTime<Utc>)> = {
            let tweaks = self.tweaks.read().await;
            tweaks
                .iter()
                .map(|(id, loaded)| (id.clone(), loaded.loaded_at))
                .collect()
        };
        ids.sort_by(|a, b| b.1.cmp(&a.1));

        for (id, _) in ids {
            if let Err(e) = self.unload_tweak(&id).await {
                error!(tweak_id = %id, error = %e, "Error unloading tweak");
            }
        }

        info!("All tweaks unloaded");
    }

    /// Lists all loaded tweaks in load order.
    pub async fn list_tweaks(&self) -> Vec<TweakStatus> {
        let tweaks = self.tweaks.read().await;
        let mut statuses: Vec<TweakStatus> = tweaks
            .values()
            .map(|loaded| TweakStatus {
                info: loaded.tweak.info(),
                live_patches: loaded.patches.live_count(),
                loaded_at: loaded.loaded_at,
            })
            .collect();
        statuses.sort_by_key(|status| status.loaded_at);
        statuses
    }

    /// Returns whether a tweak is currently loaded.
    pub async fn is_loaded(&self, tweak_id: &str) -> bool {
        self.tweaks.read().await.contains_key(tweak_id)
    }

    /// Number of loaded tweaks.
    pub async fn count(&self) -> usize {
        self.tweaks.read().await.len()
    }

    /// The module registry tweaks resolve against.
    pub fn modules(&self) -> &Arc<ModuleRegistry> {
        &self.modules
    }

    /// The interception registry tweaks are applied through.
    pub fn intercept(&self) -> &InterceptRegistry {
        &self.intercept
    }
}
