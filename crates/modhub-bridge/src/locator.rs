//! Resolve strategies for locating a target module.
//!
//! A tweak describes where its target lives as an ordered list of
//! strategies. The first strategy returning a module wins; if all miss,
//! the target is treated as absent and patching degrades to a no-op.

use std::sync::Arc;

use crate::module::ModuleRef;
use crate::registry::ModuleRegistry;

/// A single way of locating a module. Returns `None` on a miss.
pub type ResolveStrategy = Box<dyn Fn() -> Option<ModuleRef> + Send + Sync>;

/// Strategy that looks a module up by exported name.
pub fn by_name(registry: &Arc<ModuleRegistry>, name: &str) -> ResolveStrategy {
    let registry = Arc::clone(registry);
    let name = name.to_string();
    Box::new(move || registry.get(&name))
}

/// Strategy that matches a module by the members it exposes.
pub fn by_members(registry: &Arc<ModuleRegistry>, members: &[&str]) -> ResolveStrategy {
    let registry = Arc::clone(registry);
    let members: Vec<String> = members.iter().map(|m| m.to_string()).collect();
    Box::new(move || registry.find_by_members(&members))
}

/// Runs strategies in order and returns the first hit.
pub fn resolve(strategies: &[ResolveStrategy]) -> Option<ModuleRef> {
    strategies.iter().find_map(|strategy| strategy())
}
