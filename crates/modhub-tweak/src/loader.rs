//! Dynamic tweak loader using `libloading` (feature-gated).

#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::path::Path;
    use std::sync::Arc;

    use tracing::info;

    use modhub_core::error::HubError;
    use modhub_core::result::HubResult;

    use crate::tweak::Tweak;

    /// Type of the tweak creation function exported by dynamic tweaks.
    ///
    /// Dynamic tweaks must export: `extern "C" fn create_tweak() -> *mut dyn Tweak`
    pub type CreateTweakFn = unsafe extern "C" fn() -> *mut dyn Tweak;

    /// Loads a tweak from a shared library (.so / .dll / .dylib).
    pub struct DynamicLoader {
        /// Loaded libraries (kept alive for the lifetime of the loader).
        _libraries: Vec<libloading::Library>,
    }

    impl DynamicLoader {
        /// Creates a new dynamic loader.
        pub fn new() -> Self {
            Self {
                _libraries: Vec::new(),
            }
        }

        /// Loads a tweak from the given shared library path.
        ///
        /// # Safety
        /// This function loads arbitrary code from a shared library.
        /// Only load trusted tweaks.
        pub unsafe fn load_from_path(&mut self, path: &Path) -> HubResult<Arc<dyn Tweak>> {
            let lib = unsafe { libloading::Library::new(path) }.map_err(|e| {
                HubError::tweak(format!(
                    "failed to load tweak library '{}': {e}",
                    path.display()
                ))
            })?;

            let create_fn: libloading::Symbol<CreateTweakFn> = unsafe { lib.get(b"create_tweak") }
                .map_err(|e| {
                    HubError::tweak(format!(
                        "tweak '{}' missing 'create_tweak' symbol: {e}",
                        path.display()
                    ))
                })?;

            let raw_tweak = unsafe { create_fn() };
            let tweak = unsafe { Arc::from_raw(raw_tweak) };

            info!(path = %path.display(), "Dynamic tweak loaded");

            self._libraries.push(lib);

            Ok(tweak)
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for DynamicLoader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DynamicLoader")
                .field("loaded_count", &self._libraries.len())
                .finish()
        }
    }
}

/// Stub loader when dynamic feature is not enabled.
#[cfg(not(feature = "dynamic"))]
pub mod dynamic_loader {
    /// Stub dynamic loader.
    #[derive(Debug)]
    pub struct DynamicLoader;

    impl DynamicLoader {
        /// Creates a stub loader.
        pub fn new() -> Self {
            Self
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub use dynamic_loader::DynamicLoader;
