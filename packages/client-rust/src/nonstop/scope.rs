//! Per-execution-context policy override.
//!
//! The original design kept this slot in ambient thread-local state; here it
//! is an explicit context value the caller threads through its operations,
//! so "currently active override wins" holds without hidden global state.
//! The scope belongs to exactly one execution context and needs no
//! synchronization; whoever sets an override for a bounded span of calls is
//! responsible for clearing it (or restoring the previous value) before the
//! context is reused for unrelated work.

use std::sync::Arc;

use gridkit_core::NonStopPolicy;

/// Execution-context state carried alongside a span of distributed calls.
///
/// While an override is set, every resolution against this scope returns it,
/// short-circuiting all registry lookups.
#[derive(Debug, Clone, Default)]
pub struct CallScope {
    override_policy: Option<Arc<NonStopPolicy>>,
}

impl CallScope {
    /// A scope with no override: resolution falls through to the registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active override, if any.
    #[must_use]
    pub fn override_policy(&self) -> Option<&Arc<NonStopPolicy>> {
        self.override_policy.as_ref()
    }

    pub(crate) fn set(&mut self, policy: Arc<NonStopPolicy>) -> Option<Arc<NonStopPolicy>> {
        self.override_policy.replace(policy)
    }

    /// Clears the override, returning the previous value so nested spans
    /// can restore the state they found.
    pub fn clear_override(&mut self) -> Option<Arc<NonStopPolicy>> {
        self.override_policy.take()
    }

    /// Restores a previously cleared override (or clears, if `prior` is
    /// `None`). Counterpart to [`CallScope::clear_override`] for nested
    /// spans.
    pub fn restore_override(&mut self, prior: Option<Arc<NonStopPolicy>>) {
        self.override_policy = prior;
    }
}
