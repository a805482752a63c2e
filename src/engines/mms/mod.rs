//! MMS-TTS (VITS) text-to-speech engine.
//!
//! Meta's Massively Multilingual Speech project publishes one small VITS
//! checkpoint per language (`facebook/mms-tts-<iso639-3>`). This engine runs
//! ONNX exports of those checkpoints on the CPU.
//!
//! # Model Directory Layout
//!
//! ```text
//! models/facebook/mms-tts-guj/
//! ├── model.onnx              # or onnx/model.onnx
//! ├── vocab.json              # character → token id
//! ├── tokenizer_config.json   # add_blank, normalize, ...
//! └── config.json             # sampling_rate
//! ```
//!
//! An export can be produced with
//! `optimum-cli export onnx --model facebook/mms-tts-guj models/facebook/mms-tts-guj`.
//! Repositories that already carry an ONNX export are downloaded directly.
//!
//! # Inputs
//!
//! The tokenizer maps each character to an id, drops unknown characters and
//! interleaves a blank id between characters. `input_ids` and
//! `attention_mask` are always passed as int64; several language exports
//! reject narrower integer tensors.

pub mod download;
pub mod engine;
pub mod model;
pub mod tokenizer;

pub use download::{resolve_model_files, ModelFiles, ResolveOptions};
pub use engine::{MmsEngine, MmsLoader, MmsModelParams};
pub use model::MmsError;
