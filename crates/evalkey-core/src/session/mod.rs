//! Hotkey session controller.
//!
//! ## Overview
//!
//! A [`Session`] owns the mapping from key combinations to revocable
//! bindings and drives the activation flow: capture the current selection,
//! run the pipeline, and write the result back in place. The platform pieces
//! are injected:
//!
//! - [`HotkeyBackend`] registers and revokes key combinations with the OS.
//!   The backend is expected to suppress the combination itself while an
//!   activation runs, so auto-repeat cannot re-enter a run.
//! - [`SelectionHandle`] reads the currently highlighted text and replaces
//!   exactly that selection.
//!
//! Both traits are synchronous and fallible; any blocking (clipboard,
//! keyboard wait) lives inside the implementor. Tests drive the whole flow
//! with in-memory fakes.
//!
//! ## Activation semantics
//!
//! One activation is one pipeline run. Overlapping activations are rejected,
//! not queued: a second hotkey press while a run is in flight returns
//! [`Outcome::Busy`] and touches nothing. On total pipeline failure the
//! per-transformer diagnostic is logged and the selection is left unmodified.
//! The selection is also left alone when the result round-trips to the same
//! text, so an idempotent transform does not churn the clipboard.

use crate::defaults::format_float;
use anyhow::{Result, anyhow};
use evalkey_pipeline::{AllTransformersFailed, Pipeline, Value};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};


/// Access to the user's current text selection.
pub trait SelectionHandle: Send {
    /// The highlighted text at this moment.
    fn capture(&mut self) -> Result<String>;
    /// Replaces the selection captured by the preceding [`capture`](Self::capture).
    fn replace(&mut self, text: &str) -> Result<()>;
}

/// Platform hotkey registration.
pub trait HotkeyBackend: Send {
    /// Revocation token for one registered combination.
    type Binding;
    fn bind(&mut self, combo: &str) -> Result<Self::Binding>;
    fn unbind(&mut self, binding: Self::Binding) -> Result<()>;
}

/// What one activation did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The selection was replaced with the rendered result.
    Replaced(String),
    /// The pipeline result round-tripped to the captured text.
    Unchanged,
    /// Zero transformers succeeded; the selection was left alone.
    Failed(AllTransformersFailed),
    /// Another activation was already running.
    Busy,
}

/// Owns hotkey bindings and drives capture → evaluate → replace.
pub struct Session<H: HotkeyBackend, S: SelectionHandle> {
    pipeline: Arc<Pipeline>,
    hotkeys: Mutex<H>,
    selection: Mutex<S>,
    bindings: Mutex<HashMap<String, H::Binding>>,
    busy: AtomicBool,
}

impl<H: HotkeyBackend, S: SelectionHandle> Session<H, S> {
    pub fn new(pipeline: Arc<Pipeline>, hotkeys: H, selection: S) -> Self {
        Self {
            pipeline,
            hotkeys: Mutex::new(hotkeys),
            selection: Mutex::new(selection),
            bindings: Mutex::new(HashMap::new()),
            busy: AtomicBool::new(false),
        }
    }

    /// Registers `combo`. Rebinding an already-bound combination revokes the
    /// previous binding first.
    pub fn bind(&self, combo: &str) -> Result<()> {
        let mut hotkeys = lock(&self.hotkeys);
        let binding = hotkeys.bind(combo)?;
        if let Some(previous) = lock(&self.bindings).insert(combo.to_string(), binding) {
            hotkeys.unbind(previous)?;
        }
        Ok(())
    }

    /// Revokes the binding for `combo`.
    pub fn unbind(&self, combo: &str) -> Result<()> {
        let binding = lock(&self.bindings)
            .remove(combo)
            .ok_or_else(|| anyhow!("no binding registered for `{combo}`"))?;
        lock(&self.hotkeys).unbind(binding)
    }

    /// Revokes every binding. Also runs on drop.
    pub fn stop(&self) -> Result<()> {
        let mut bindings = lock(&self.bindings);
        let mut hotkeys = lock(&self.hotkeys);
        for (_, binding) in bindings.drain() {
            hotkeys.unbind(binding)?;
        }
        Ok(())
    }

    /// Currently bound combinations, for display.
    pub fn bound_combos(&self) -> Vec<String> {
        lock(&self.bindings).keys().cloned().collect()
    }

    /// Drives one activation. Called by the hotkey backend when a bound
    /// combination fires; re-entry while a run is in flight is rejected.
    pub fn activate(&self) -> Result<Outcome> {
        if self.busy.swap(true, Ordering::SeqCst) {
            debug!("activation ignored: a run is already in progress");
            return Ok(Outcome::Busy);
        }
        let outcome = self.run_once();
        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    fn run_once(&self) -> Result<Outcome> {
        let text = lock(&self.selection).capture()?;
        match self.pipeline.evaluate(Value::Text(text.clone())) {
            Ok(value) => {
                let rendered = render(&value);
                if rendered == text {
                    debug!("result matches the captured text; leaving the selection alone");
                    Ok(Outcome::Unchanged)
                } else {
                    lock(&self.selection).replace(&rendered)?;
                    Ok(Outcome::Replaced(rendered))
                }
            }
            Err(report) => {
                warn!("evaluation failed:\n{report}");
                Ok(Outcome::Failed(report))
            }
        }
    }
}

impl<H: HotkeyBackend, S: SelectionHandle> Drop for Session<H, S> {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!("failed to revoke hotkey bindings: {error:#}");
        }
    }
}

/// Renders a non-text pipeline result for write-back, mirroring the default
/// formatting transformer.
fn render(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Int(n) => n.to_string(),
        Value::Float(x) => format_float(*x),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
