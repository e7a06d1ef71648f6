//! # evalkey Core
//!
//! Session controller, default transformers, and the math backend seam for
//! the evalkey hotkey evaluator.
//!
//! ## Overview
//!
//! This crate wires the two engine crates together into the actual product
//! behavior: a hotkey fires, the highlighted text is captured, the pipeline
//! rewrites it, and the result replaces the selection.
//!
//! ## Modules
//!
//! - [`backend`] - The narrow expression-string-in / number-out contract to
//!   the math evaluator, plus a built-in numeric implementation
//! - [`defaults`] - The stock transformer chain: math (normalize + evaluate)
//!   and number formatting
//! - [`session`] - Hotkey bindings with an explicit lifecycle and the
//!   capture/evaluate/replace activation flow
//!
//! ## Design Philosophy
//!
//! - **Platform Agnostic**: OS-level hotkey registration and selection
//!   access live behind traits; this crate never touches the platform
//!   directly
//! - **Testability**: Every external interaction is mockable, so the whole
//!   activation flow runs under plain unit tests
//! - **Contained Failures**: A failing transformer is diagnostic data, not a
//!   crash; the user's text is only ever replaced by a successful run

pub mod backend;
pub mod defaults;
pub mod session;
