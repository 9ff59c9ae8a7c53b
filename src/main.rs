//! ModHub Host — reference harness for the tweak framework.
//!
//! Wires a simulated native audio bridge, loads the tweaks enabled in
//! configuration, runs a short smoke sequence through the patched bridge,
//! and keeps the tweaks active until shutdown.

mod sim;

use std::sync::Arc;

use serde_json::json;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use modhub_bridge::module::ModuleRef;
use modhub_bridge::registry::ModuleRegistry;
use modhub_core::config::HostConfig;
use modhub_core::error::HubError;
use modhub_patch::table::TablePatchProvider;
use modhub_tweak::manager::TweakManager;
use modhub_tweak::tweak::Tweak;
use tweak_audiofix::AudiofixTweak;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from optional files and environment
fn load_configuration() -> Result<HostConfig, HubError> {
    let env = std::env::var("MODHUB_ENV").unwrap_or_else(|_| "development".to_string());
    HostConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &HostConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main host run function
async fn run(config: HostConfig) -> Result<(), HubError> {
    tracing::info!("Starting ModHub host v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Simulated native bridge ──────────────────────────
    let modules = Arc::new(ModuleRegistry::new());
    let audio = sim::register_audio_manager(&modules)?;
    tracing::info!("Simulated bridge ready ({} modules)", modules.len());

    // ── Step 2: Tweak manager + configured tweaks ────────────────
    let manager = TweakManager::new(Arc::clone(&modules), Arc::new(TablePatchProvider::new()));

    if config.tweaks.auto_load {
        for name in &config.tweaks.enabled {
            let tweak: Arc<dyn Tweak> = match name.as_str() {
                "audiofix" => Arc::new(AudiofixTweak::new()),
                other => {
                    tracing::warn!(tweak = %other, "Unknown tweak in configuration; skipping");
                    continue;
                }
            };
            manager.load_tweak(tweak).await?;
        }
    } else {
        tracing::info!("Tweak auto-load disabled");
    }

    #[cfg(feature = "dynamic")]
    load_dynamic_tweaks(&manager, &config.tweaks.directory).await?;

    for status in manager.list_tweaks().await {
        tracing::info!(
            tweak_id = %status.info.id,
            version = %status.info.version,
            patches = status.live_patches,
            "Tweak active"
        );
    }

    // ── Step 3: Smoke calls through the patched bridge ───────────
    smoke_sequence(&audio)?;

    // ── Step 4: Graceful shutdown ────────────────────────────────
    tracing::info!("ModHub host running; press Ctrl+C to stop");
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, unloading tweaks...");

    manager.unload_all().await;

    let mode = audio.call("getMode", &[])?;
    tracing::info!(mode = %mode, "Bridge restored to original behavior");
    tracing::info!("ModHub host shut down gracefully");
    Ok(())
}

/// Exercise the patched members once so their effect shows up in the logs
fn smoke_sequence(audio: &ModuleRef) -> Result<(), HubError> {
    let focus = audio.call("requestAudioFocus", &[])?;
    audio.call("setCommunicationModeOn", &[json!(true)])?;
    let comm = audio.call("isCommunicationModeOn", &[])?;
    audio.call("setMode", &[json!(2)])?;
    let mode = audio.call("getMode", &[])?;

    tracing::info!(
        focus = %focus,
        communication = %comm,
        mode = %mode,
        "Smoke sequence complete"
    );
    Ok(())
}

/// Load tweaks from shared libraries in the configured directory
#[cfg(feature = "dynamic")]
async fn load_dynamic_tweaks(manager: &TweakManager, directory: &str) -> Result<(), HubError> {
    use modhub_tweak::DynamicLoader;

    let dir = std::path::Path::new(directory);
    if !dir.is_dir() {
        tracing::debug!("Tweak directory '{}' not present; skipping", directory);
        return Ok(());
    }

    let mut loader = DynamicLoader::new();
    let entries = std::fs::read_dir(dir).map_err(|e| {
        HubError::tweak(format!("failed to read tweak directory '{directory}': {e}"))
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| HubError::tweak(format!("failed to read tweak directory entry: {e}")))?
            .path();
        let is_library = path
            .extension()
            .map(|ext| ext == "so" || ext == "dll" || ext == "dylib")
            .unwrap_or(false);
        if !is_library {
            continue;
        }

        let tweak = unsafe { loader.load_from_path(&path) }?;
        manager.load_tweak(tweak).await?;
    }

    // The mapped libraries must stay alive as long as their tweaks do.
    std::mem::forget(loader);
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
