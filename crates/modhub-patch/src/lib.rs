//! ModHub Patch — reversible method interception for bridge modules.
//!
//! This crate provides the patching machinery tweaks are built on:
//!
//! - [`descriptor`]: declarative patch descriptors (replace / after)
//! - [`provider`]: the [`PatchProvider`] seam patch application goes through
//! - [`table`]: the default provider over [`BridgeModule`] method tables
//! - [`handle`]: idempotent per-patch handles and aggregate patch sets
//! - [`registry`]: the [`InterceptRegistry`] tying resolution, application,
//!   and reversal together
//!
//! [`BridgeModule`]: modhub_bridge::module::BridgeModule

pub mod descriptor;
pub mod handle;
pub mod provider;
pub mod registry;
pub mod table;

pub use descriptor::{AfterFn, PatchAction, PatchDescriptor, ReplaceFn};
pub use handle::{PatchHandle, PatchSet, UndoFn};
pub use provider::PatchProvider;
pub use registry::InterceptRegistry;
pub use table::TablePatchProvider;
