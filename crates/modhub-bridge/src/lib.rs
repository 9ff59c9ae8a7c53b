//! # modhub-bridge
//!
//! The host-side bridge model for ModHub. Provides:
//!
//! - [`BridgeModule`]: a named object exposing named callable members over
//!   JSON values, with explicit capability probing
//! - [`ModuleRegistry`]: the host's catalog of bridge modules
//! - [`locator`]: resolution-strategy constructors for locating a module by
//!   name or by the members it exports

pub mod locator;
pub mod module;
pub mod registry;

pub use locator::ResolveStrategy;
pub use module::{BridgeModule, BridgeModuleBuilder, MethodFn, ModuleId, ModuleRef};
pub use registry::ModuleRegistry;
