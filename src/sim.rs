//! Simulated native audio-manager bridge module.
//!
//! Stands in for the host's real native module so patched behavior stays
//! observable from the logs: unpatched `requestAudioFocus` reports `1`,
//! mode changes are recorded, and `getMode` reads the recorded state back.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tracing::debug;

use modhub_bridge::module::{BridgeModule, ModuleRef};
use modhub_bridge::registry::ModuleRegistry;
use modhub_core::result::HubResult;

/// Internal state of the simulated audio manager.
#[derive(Debug, Default)]
struct AudioState {
    /// Last mode handed to `setMode`.
    mode: i64,
    /// Communication-mode flag.
    communication_on: bool,
    /// Focus requests seen since startup.
    focus_requests: u64,
}

/// Builds the simulated audio manager and registers it under the name the
/// host exports it as.
pub fn register_audio_manager(modules: &Arc<ModuleRegistry>) -> HubResult<ModuleRef> {
    let state = Arc::new(Mutex::new(AudioState::default()));

    let set_mode = Arc::clone(&state);
    let get_mode = Arc::clone(&state);
    let set_comm = Arc::clone(&state);
    let get_comm = Arc::clone(&state);
    let focus = Arc::clone(&state);

    let module = Arc::new(
        BridgeModule::builder("RTNAudioManager")
            .method("setMode", move |_, args| {
                let mode = args.first().and_then(Value::as_i64).unwrap_or(0);
                set_mode.lock().unwrap_or_else(|e| e.into_inner()).mode = mode;
                debug!("[SimAudio] setMode {mode}");
                Ok(Value::Null)
            })
            .method("getMode", move |_, _| {
                let mode = get_mode.lock().unwrap_or_else(|e| e.into_inner()).mode;
                Ok(json!(mode))
            })
            .method("setCommunicationModeOn", move |_, args| {
                let on = args.first().and_then(Value::as_bool).unwrap_or(false);
                set_comm
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .communication_on = on;
                debug!("[SimAudio] setCommunicationModeOn {on}");
                Ok(Value::Null)
            })
            .method("isCommunicationModeOn", move |_, _| {
                let on = get_comm
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .communication_on;
                Ok(json!(on))
            })
            .method("requestAudioFocus", move |_, _| {
                let mut state = focus.lock().unwrap_or_else(|e| e.into_inner());
                state.focus_requests += 1;
                debug!("[SimAudio] requestAudioFocus #{}", state.focus_requests);
                Ok(json!(1))
            })
            .method("abandonAudioFocus", |_, _| Ok(json!(1)))
            .build(),
    );

    modules.register(Arc::clone(&module))?;
    Ok(module)
}
