//! Speech synthesis engines.
//!
//! This module contains implementations of text-to-speech engines.
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `mms` - MMS-TTS / VITS (ONNX format), enabled by default

#[cfg(feature = "mms")]
pub mod mms;
