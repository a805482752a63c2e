//! # mms-tts-rs
//!
//! Text-to-speech for Indian languages built on Meta's MMS-TTS (VITS) models
//! exported to ONNX.
//!
//! ## Features
//!
//! - **Lazy model cache**: one model per language, loaded on first use
//! - **Ten languages out of the box**: Gujarati, Hindi, English, Marathi,
//!   Bengali, Tamil, Telugu, Kannada, Punjabi, Malayalam
//! - **Two front ends**: a JSON API (`POST /tts`) and a browser form
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mms_tts_rs::{
//!     cache::ModelCache, engines::mms::MmsLoader, language::LanguageRegistry,
//!     service::{ServiceConfig, TtsService},
//! };
//!
//! let cache = ModelCache::new(Box::new(MmsLoader::default()), LanguageRegistry::default());
//! let service = TtsService::new(Arc::new(cache), ServiceConfig::default());
//!
//! let speech = service.text_to_speech("નમસ્તે", None)?;
//! println!("wrote {} at {}Hz", speech.file.display(), speech.sampling_rate);
//! # Ok::<(), mms_tts_rs::TtsError>(())
//! ```

pub mod audio;
pub mod cache;
pub mod config;
pub mod engines;
pub mod error;
pub mod language;
pub mod server;
pub mod service;
pub mod synthesis;

use std::path::Path;
use std::sync::Arc;

pub use error::TtsError;
pub use language::LanguageModelKey;
pub use synthesis::{synthesize, validate_text};

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    /// Raw audio samples as f32 values, exactly as the model produced them
    pub samples: Vec<f32>,
    /// Sample rate of the audio (16000 for MMS-TTS)
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to a 32-bit float WAV file, replacing any existing file.
    pub fn write_wav(&self, path: &Path) -> Result<(), TtsError> {
        audio::write_wav(path, &self.samples, self.sample_rate).map(|_| ())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// A loaded, ready-to-run text-to-waveform model.
///
/// Implementations are shared between requests through an `Arc`, so they must
/// not change observable state after construction.
pub trait SynthesisEngine: Send + Sync {
    /// Fixed output sample rate of the model.
    fn sample_rate(&self) -> u32;

    /// Run one forward pass over `text` and return the raw waveform.
    ///
    /// Callers validate `text` first; see [`synthesize`].
    fn generate_waveform(&self, text: &str) -> Result<Vec<f32>, TtsError>;
}

/// Constructs engines from pretrained model identifiers.
///
/// This is the expensive step the [`cache::ModelCache`] memoizes.
pub trait ModelLoader: Send + Sync {
    /// Load the model published under `model_id`.
    ///
    /// Failures are reported as [`TtsError::ModelLoad`].
    fn load(&self, model_id: &str) -> Result<Arc<dyn SynthesisEngine>, TtsError>;
}
