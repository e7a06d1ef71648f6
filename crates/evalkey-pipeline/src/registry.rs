use crate::dispatch;
use crate::value::{AllTransformersFailed, TransformError, TypeTag, Value};
use std::fmt;
use std::sync::{Arc, Mutex};

/// The callable shape of a transformer.
///
/// Outcomes are explicit result values; a transformer that wants to use its
/// own error type translates it to a [`TransformError`] at this boundary.
pub type TransformFn = dyn Fn(&Value) -> Result<Value, TransformError> + Send + Sync;

/// A transformer being handed to [`Registry::register`].
///
/// Built with [`Transformer::new`] plus the optional [`priority`](Self::priority)
/// and [`requires`](Self::requires) settings, mirroring the registration
/// contract: priority defaults to "after everything registered so far", and
/// an absent requirement means "accepts any value".
pub struct Transformer {
    name: String,
    transform: Arc<TransformFn>,
    priority: Option<i64>,
    required: Option<TypeTag>,
}

impl Transformer {
    pub fn new<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
            priority: None,
            required: None,
        }
    }

    /// Explicit priority; higher runs earlier.
    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Gate execution on the working value's shape.
    pub fn requires(mut self, required: TypeTag) -> Self {
        self.required = Some(required);
        self
    }
}

/// One registered entry. Immutable once inserted.
#[derive(Clone)]
pub struct TransformerEntry {
    name: String,
    priority: i64,
    required: Option<TypeTag>,
    transform: Arc<TransformFn>,
}

impl TransformerEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn required(&self) -> Option<TypeTag> {
        self.required
    }

    pub(crate) fn invoke(&self, working: &Value) -> Result<Value, TransformError> {
        if let Some(required) = self.required
            && !working.satisfies(required)
        {
            return Err(TransformError::TypeMismatch {
                expected: required,
                actual: working.tag(),
            });
        }
        (self.transform)(working)
    }
}

impl fmt::Debug for TransformerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerEntry")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Ordered, append-only collection of transformers.
///
/// Entries are kept sorted by descending priority; ties keep insertion
/// order. When a registration omits the priority it is assigned
/// `lowest - 1` (or `0` into an empty registry), so by default newly added
/// transformers run after all previously added ones.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Arc<TransformerEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the transformer and returns its assigned priority.
    pub fn register(&mut self, transformer: Transformer) -> i64 {
        let priority = transformer.priority.unwrap_or_else(|| {
            // Sorted descending, so the last entry carries the lowest priority.
            match self.entries.last() {
                Some(last) => last.priority - 1,
                None => 0,
            }
        });
        let entry = Arc::new(TransformerEntry {
            name: transformer.name,
            priority,
            required: transformer.required,
            transform: transformer.transform,
        });
        // Stable descending insort: after all entries of equal priority.
        let index = self.entries.partition_point(|e| e.priority >= priority);
        self.entries.insert(index, entry);
        priority
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in evaluation order (descending priority).
    pub fn entries(&self) -> impl Iterator<Item = &TransformerEntry> {
        self.entries.iter().map(|entry| &**entry)
    }

    /// An immutable copy of the current ordering for one run to consume.
    pub(crate) fn snapshot(&self) -> Vec<Arc<TransformerEntry>> {
        self.entries.clone()
    }
}

/// Shared facade over [`Registry`] tying registration and evaluation
/// together.
///
/// Registration and run-time snapshotting are atomic with respect to each
/// other: `evaluate` copies the ordering under the lock and releases it
/// before invoking any transformer, so an in-flight run can never observe a
/// concurrent registration.
#[derive(Debug, Default)]
pub struct Pipeline {
    registry: Mutex<Registry>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`Registry::register`].
    pub fn register(&self, transformer: Transformer) -> i64 {
        self.lock().register(transformer)
    }

    /// Runs the registered transformers against `input` until no further
    /// progress can be made. See the crate-level documentation for the
    /// algorithm.
    pub fn evaluate(&self, input: Value) -> Result<Value, AllTransformersFailed> {
        let snapshot = self.lock().snapshot();
        dispatch::run(snapshot, input)
    }

    /// Runs `f` against the registry, for inspection.
    pub fn with_registry<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        f(&self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        // A poisoned lock means a registration panicked; the registry itself
        // is still a consistent Vec.
        self.registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
