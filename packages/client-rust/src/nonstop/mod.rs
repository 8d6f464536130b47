//! Non-stop operation support: policy registry, per-context override scope,
//! and the bounded-wait executor.
//!
//! An application thread about to perform a distributed operation resolves
//! the effective [`gridkit_core::NonStopPolicy`] through the
//! [`NonStopRegistry`] (scope override > most specific registration > less
//! specific > built-in default), then runs the operation through the
//! [`NonStopExecutor`], which bounds the wait and reports the substituted
//! behavior on timeout or shutdown.

pub mod executor;
pub mod key;
pub mod registry;
pub mod scope;

pub use executor::{NonStopExecutor, Outcome, ReadOutcome, WriteOutcome};
pub use key::PolicyKey;
pub use registry::NonStopRegistry;
pub use scope::CallScope;
