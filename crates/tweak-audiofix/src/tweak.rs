//! Audiofix tweak implementation.
//!
//! When a call starts, the host flips the native audio manager into
//! communication mode and requests audio focus, which swaps the volume UI
//! to call volume. The tweak neutralizes that path: communication mode
//! becomes a no-op, focus requests answer with a fixed response without
//! taking focus, and any mode change is forced back to normal right after
//! it lands.

use modhub_tweak::prelude::*;
use serde_json::json;

/// Audio mode the host treats as "no call in progress".
const MODE_NORMAL: i64 = 0;

/// Fixed response for patched focus requests.
const FOCUS_RESPONSE: i64 = 0;

/// The audiofix tweak.
#[derive(Debug, Default)]
pub struct AudiofixTweak;

impl AudiofixTweak {
    /// Creates the tweak.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tweak for AudiofixTweak {
    fn info(&self) -> TweakInfo {
        tweak_info!(
            id: "audiofix",
            name: "Audiofix",
            version: "1.0.0",
            description: "Stops in-call audio routing from hijacking the volume UI",
            author: "ModHub Team",
            patches: ["setCommunicationModeOn", "requestAudioFocus", "setMode"]
        )
    }

    fn strategies(&self, modules: &Arc<ModuleRegistry>) -> Vec<ResolveStrategy> {
        // Shape lookup first; module names drift across host versions.
        vec![
            locator::by_members(modules, &["setCommunicationModeOn", "requestAudioFocus"]),
            locator::by_name(modules, "NativeAudioManagerModule"),
            locator::by_name(modules, "RTNAudioManager"),
        ]
    }

    fn descriptors(&self) -> Vec<PatchDescriptor> {
        vec![
            PatchDescriptor::replace("setCommunicationModeOn", |_, _| Ok(Value::Null)),
            PatchDescriptor::replace("requestAudioFocus", |_, _| Ok(json!(FOCUS_RESPONSE))),
            PatchDescriptor::after("setMode", |module, _, _| {
                module.call("setMode", &[json!(MODE_NORMAL)])?;
                Ok(())
            }),
        ]
    }

    async fn on_load(&self) -> Result<(), String> {
        Ok(())
    }

    async fn on_unload(&self) -> Result<(), String> {
        Ok(())
    }
}
