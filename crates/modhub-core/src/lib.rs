//! # modhub-core
//!
//! Core crate for ModHub. Contains the unified error system, the shared
//! result alias, and the configuration schemas for the host harness.
//!
//! This crate has **no** internal dependencies on other ModHub crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::HubError;
pub use result::HubResult;
