//! Patch descriptors — which member to intercept and how.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use modhub_bridge::module::BridgeModule;
use modhub_core::result::HubResult;

/// Signature of a replacement handler. Runs instead of the original member.
pub type ReplaceFn = dyn Fn(&BridgeModule, &[Value]) -> HubResult<Value> + Send + Sync;

/// Signature of an after handler. Runs once the original member (or the
/// topmost replacement) has returned successfully, observing the arguments
/// and the produced value. Its return value never reaches the caller.
pub type AfterFn = dyn Fn(&BridgeModule, &[Value], &Value) -> HubResult<()> + Send + Sync;

/// How a patch intercepts the member it names.
#[derive(Clone)]
pub enum PatchAction {
    /// The handler runs in place of the original; the original never runs.
    Replace(Arc<ReplaceFn>),
    /// The original runs to completion first; the handler then observes the
    /// call for its side effects only.
    After(Arc<AfterFn>),
}

impl PatchAction {
    /// Short mode name for diagnostics.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Replace(_) => "replace",
            Self::After(_) => "after",
        }
    }
}

impl fmt::Debug for PatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatchAction::{}", self.mode())
    }
}

/// A single declarative patch: a member name plus the interception action.
///
/// Descriptors carry no target; the same descriptor list can be activated
/// against whichever module resolution produced.
#[derive(Clone)]
pub struct PatchDescriptor {
    /// Name of the member to intercept.
    pub method: String,
    /// How to intercept it.
    pub action: PatchAction,
}

impl PatchDescriptor {
    /// Builds a replace-mode descriptor.
    pub fn replace(
        method: impl Into<String>,
        handler: impl Fn(&BridgeModule, &[Value]) -> HubResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            method: method.into(),
            action: PatchAction::Replace(Arc::new(handler)),
        }
    }

    /// Builds an after-mode descriptor.
    pub fn after(
        method: impl Into<String>,
        handler: impl Fn(&BridgeModule, &[Value], &Value) -> HubResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            method: method.into(),
            action: PatchAction::After(Arc::new(handler)),
        }
    }
}

impl fmt::Debug for PatchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchDescriptor")
            .field("method", &self.method)
            .field("mode", &self.action.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_names() {
        let replace = PatchDescriptor::replace("setMode", |_, _| Ok(json!(null)));
        let after = PatchDescriptor::after("setMode", |_, _, _| Ok(()));

        assert_eq!(replace.action.mode(), "replace");
        assert_eq!(after.action.mode(), "after");
        assert_eq!(
            format!("{replace:?}"),
            "PatchDescriptor { method: \"setMode\", mode: \"replace\" }"
        );
    }
}
