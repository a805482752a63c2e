//! The conversion pipeline shared by every front end.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use derive_builder::Builder;
use parking_lot::RwLock;
use serde::Serialize;

use crate::cache::ModelCache;
use crate::language::LanguageModelKey;
use crate::{synthesize, validate_text, TtsError};

pub const DEFAULT_OUTPUT_PATH: &str = "tts_output.wav";

/// Settings for [`TtsService`].
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default)]
pub struct ServiceConfig {
    /// Where each conversion is written. Overwritten on every success.
    pub output_path: PathBuf,
    /// Language used when a request does not name one.
    pub default_language: LanguageModelKey,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            default_language: LanguageModelKey::default(),
        }
    }
}

/// A finished conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechFile {
    pub file: PathBuf,
    pub sampling_rate: u32,
}

/// Text in, WAV file out.
pub struct TtsService {
    cache: Arc<ModelCache>,
    config: ServiceConfig,
    /// Writers take it exclusively; readers of the output file share it.
    output_lock: RwLock<()>,
}

impl TtsService {
    pub fn new(cache: Arc<ModelCache>, config: ServiceConfig) -> Self {
        Self {
            cache,
            config,
            output_lock: RwLock::new(()),
        }
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn output_path(&self) -> &Path {
        &self.config.output_path
    }

    /// Bytes of the most recent output file.
    ///
    /// Never observes a write in progress. `NotFound` until the first
    /// successful conversion.
    pub fn read_output(&self) -> std::io::Result<Vec<u8>> {
        let _guard = self.output_lock.read();
        std::fs::read(&self.config.output_path)
    }

    /// Convert `text` and write it to the configured output path.
    pub fn text_to_speech(
        &self,
        text: &str,
        language: Option<&LanguageModelKey>,
    ) -> Result<SpeechFile, TtsError> {
        let output_path = self.config.output_path.clone();
        self.text_to_speech_at(text, language, output_path)
    }

    /// Convert `text` and write it to `output_path`.
    ///
    /// Input is validated before any model is loaded.
    pub fn text_to_speech_at(
        &self,
        text: &str,
        language: Option<&LanguageModelKey>,
        output_path: PathBuf,
    ) -> Result<SpeechFile, TtsError> {
        validate_text(text)?;

        let language = language.unwrap_or(&self.config.default_language);
        let model = self.cache.get_or_load(language)?;
        let result = synthesize(text, model.as_ref())?;

        let _guard = self.output_lock.write();
        result.write_wav(&output_path)?;
        log::info!(
            "Converted {} chars of {language} text to {:.2}s of audio at {}",
            text.chars().count(),
            result.duration_secs(),
            output_path.display()
        );

        Ok(SpeechFile {
            file: output_path,
            sampling_rate: result.sample_rate,
        })
    }
}
