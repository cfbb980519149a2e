//! WebAssembly bindings for the LS-8 emulator.
//!
//! This module provides JavaScript-callable interfaces to the LS-8 CPU,
//! enabling browser-based execution of `.ls8` programs.

#[cfg(feature = "wasm")]
pub mod api;

#[cfg(feature = "wasm")]
pub use api::Ls8Emulator;
