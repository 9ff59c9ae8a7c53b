//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use serde_json::{Value, json};

use modhub_bridge::module::{BridgeModule, ModuleRef};
use modhub_bridge::registry::ModuleRegistry;
use modhub_patch::table::TablePatchProvider;
use modhub_tweak::manager::TweakManager;
use tweak_audiofix::AudiofixTweak;

/// Observable state behind the simulated audio module.
#[derive(Debug, Default)]
pub struct AudioProbe {
    mode: AtomicI64,
    set_mode_runs: AtomicU64,
    communication_on: AtomicBool,
}

impl AudioProbe {
    /// Last mode the native side recorded.
    pub fn mode(&self) -> i64 {
        self.mode.load(Ordering::SeqCst)
    }

    /// How many times the native `setMode` body ran.
    pub fn set_mode_runs(&self) -> u64 {
        self.set_mode_runs.load(Ordering::SeqCst)
    }

    /// Whether the native side saw communication mode switched on.
    pub fn communication_on(&self) -> bool {
        self.communication_on.load(Ordering::SeqCst)
    }
}

/// Test host context: a tweak manager over a simulated audio bridge whose
/// native-side effects are observable through [`AudioProbe`].
pub struct TestHost {
    /// The tweak manager under test.
    pub manager: TweakManager,
    /// The simulated audio module.
    pub audio: ModuleRef,
    /// Probe into the module's native-side state.
    pub probe: Arc<AudioProbe>,
}

impl TestHost {
    /// Host whose audio module exposes the full member set.
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Host whose audio module lacks `setMode`.
    pub fn without_set_mode() -> Self {
        Self::build(false)
    }

    /// Manager over a bridge with no audio module registered at all.
    pub fn empty_bridge() -> TweakManager {
        TweakManager::new(
            Arc::new(ModuleRegistry::new()),
            Arc::new(TablePatchProvider::new()),
        )
    }

    fn build(with_set_mode: bool) -> Self {
        let probe = Arc::new(AudioProbe::default());

        let comm_probe = Arc::clone(&probe);
        let read_probe = Arc::clone(&probe);
        let mut builder = BridgeModule::builder("RTNAudioManager")
            .method("setCommunicationModeOn", move |_, args| {
                let on = args.first().and_then(Value::as_bool).unwrap_or(false);
                comm_probe.communication_on.store(on, Ordering::SeqCst);
                Ok(Value::Null)
            })
            .method("requestAudioFocus", |_, _| Ok(json!(1)))
            .method("abandonAudioFocus", |_, _| Ok(json!(1)))
            .method("getMode", move |_, _| {
                Ok(json!(read_probe.mode.load(Ordering::SeqCst)))
            });

        if with_set_mode {
            let mode_probe = Arc::clone(&probe);
            builder = builder.method("setMode", move |_, args| {
                let mode = args.first().and_then(Value::as_i64).unwrap_or(0);
                mode_probe.mode.store(mode, Ordering::SeqCst);
                mode_probe.set_mode_runs.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Null)
            });
        }

        let audio: ModuleRef = Arc::new(builder.build());
        let modules = Arc::new(ModuleRegistry::new());
        modules
            .register(Arc::clone(&audio))
            .expect("audio module registers");

        Self {
            manager: TweakManager::new(modules, Arc::new(TablePatchProvider::new())),
            audio,
            probe,
        }
    }

    /// Loads the audiofix tweak, panicking on failure.
    pub async fn load_audiofix(&self) {
        self.manager
            .load_tweak(Arc::new(AudiofixTweak::new()))
            .await
            .expect("audiofix loads");
    }

    /// Calls a member on the audio module, panicking on failure.
    pub fn call(&self, method: &str, args: &[Value]) -> Value {
        self.audio.call(method, args).expect("bridge call succeeds")
    }
}
