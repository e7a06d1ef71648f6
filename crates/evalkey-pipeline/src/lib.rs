//! # evalkey Pipeline
//!
//! Prioritized transformer registry and retry-until-stable dispatcher.
//!
//! ## Overview
//!
//! This crate is the engine room of evalkey: an ordered set of registered
//! "transformers" (fallible value-to-value functions) is tried against a
//! captured value until no more progress can be made. One transformer
//! typically normalizes notation and evaluates math, another renders the
//! numeric result back to text; the dispatcher is what lets them chain
//! without knowing about each other.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  register()   ┌────────────┐  snapshot   ┌────────────┐
//! │ Transformer  │ ────────────► │  Pipeline  │ ──────────► │    run     │
//! │ (name, fn,   │               │ (Registry  │  per call   │ (retry to  │
//! │  priority?,  │               │  + mutex)  │             │  stability)│
//! │  required?)  │               └────────────┘             └────────────┘
//! └──────────────┘                                                │
//!                                        Ok(Value) / AllTransformersFailed
//! ```
//!
//! ## The dispatch algorithm
//!
//! `evaluate` copies the registry ordering (descending priority, stable on
//! ties), then repeats:
//!
//! 1. Scan the remaining entries in order. An entry whose declared
//!    requirement rejects the current working value records a type-mismatch
//!    failure and is skipped. Otherwise the transformer runs: on success the
//!    working value is replaced, the entry is retired, its recorded failure
//!    (if any) is cleared, and the scan restarts from the top; on failure
//!    the error is recorded and the scan moves on.
//! 2. A full scan with zero successes terminates the run.
//!
//! Restarting after every success is the point: a lower-priority
//! transformer's output can unblock a higher-priority one that previously
//! failed its type gate, while the highest-priority applicable transformer
//! is always preferred at each step. If at least one transformer succeeded
//! the final working value is returned; if none did and failures were
//! recorded, the run fails with [`AllTransformersFailed`] carrying the full
//! per-transformer failure map; an empty registry returns the input
//! unchanged.
//!
//! ## Concurrency
//!
//! The registry is append-only and guarded by a mutex; a run operates on an
//! immutable snapshot taken under the lock, so concurrent registration can
//! never disturb an in-flight run. Transformer invocations themselves are
//! plain synchronous calls with no timeout.
//!
//! ## Examples
//!
//! ```
//! use evalkey_pipeline::{Pipeline, Transformer, TypeTag, Value};
//!
//! let pipeline = Pipeline::new();
//! pipeline.register(Transformer::new("double", |v| match v {
//!     Value::Int(n) => Ok(Value::Int(n * 2)),
//!     _ => Err(evalkey_pipeline::TransformError::failed("not an int")),
//! }).requires(TypeTag::Int));
//!
//! assert_eq!(pipeline.evaluate(Value::Int(21)), Ok(Value::Int(42)));
//! ```

mod dispatch;
/// Registry, entries, and the shared [`Pipeline`] facade.
pub mod registry;
/// Working values, capability tags, and the error taxonomy.
pub mod value;

#[cfg(test)]
mod tests;

pub use registry::{Pipeline, Registry, TransformFn, Transformer, TransformerEntry};
pub use value::{AllTransformersFailed, TransformError, TypeTag, Value};
