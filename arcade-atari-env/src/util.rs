//! Utilities for test.
mod scripted;
pub use scripted::ScriptedEmulator;
