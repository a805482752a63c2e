use std::path::PathBuf;
use std::sync::Arc;

use crate::{ModelLoader, SynthesisEngine, TtsError};

use super::download::{resolve_model_files, ResolveOptions};
use super::model::{MmsError, MmsModel};

/// Parameters for configuring MMS model loading.
#[derive(Debug, Clone, Default)]
pub struct MmsModelParams {
    /// Number of CPU threads to use for inference.
    /// `None` uses the ORT default (typically all available cores).
    pub num_threads: Option<usize>,
    /// Directory searched for `<owner>/<name>/` model folders before the Hub.
    pub models_dir: Option<PathBuf>,
    /// Never download; only use local model folders.
    pub offline: bool,
    /// Hub revision to download.
    pub revision: Option<String>,
}

/// A loaded MMS-TTS model ready for synthesis.
pub struct MmsEngine {
    model_id: String,
    model: MmsModel,
}

impl SynthesisEngine for MmsEngine {
    fn sample_rate(&self) -> u32 {
        self.model.sample_rate()
    }

    fn generate_waveform(&self, text: &str) -> Result<Vec<f32>, TtsError> {
        self.model.synthesize_text(text).map_err(|e| {
            log::warn!("Inference with {} failed: {e}", self.model_id);
            TtsError::Inference(e.to_string())
        })
    }
}

/// Builds [`MmsEngine`]s on the CPU execution provider.
///
/// # Quick Start
///
/// ```rust,no_run
/// use mms_tts_rs::{engines::mms::{MmsLoader, MmsModelParams}, synthesize, ModelLoader};
///
/// let loader = MmsLoader::new(MmsModelParams::default());
/// let model = loader.load("facebook/mms-tts-hin")?;
/// let result = synthesize("नमस्ते", model.as_ref())?;
/// println!("{} samples at {}Hz", result.samples.len(), result.sample_rate);
/// # Ok::<(), mms_tts_rs::TtsError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MmsLoader {
    params: MmsModelParams,
}

impl MmsLoader {
    pub fn new(params: MmsModelParams) -> Self {
        Self { params }
    }

    fn load_engine(&self, model_id: &str) -> Result<MmsEngine, MmsError> {
        let options = ResolveOptions {
            models_dir: self.params.models_dir.clone(),
            offline: self.params.offline,
            revision: self.params.revision.clone(),
        };
        let files = resolve_model_files(model_id, &options)?;
        let model = MmsModel::load(&files, self.params.num_threads)?;
        log::info!(
            "Loaded {model_id}: {} vocabulary entries, {}Hz",
            model.tokenizer().vocab_size(),
            model.sample_rate()
        );
        Ok(MmsEngine {
            model_id: model_id.to_string(),
            model,
        })
    }
}

impl ModelLoader for MmsLoader {
    fn load(&self, model_id: &str) -> Result<Arc<dyn SynthesisEngine>, TtsError> {
        let engine = self
            .load_engine(model_id)
            .map_err(|e| TtsError::model_load(model_id, e))?;
        Ok(Arc::new(engine))
    }
}
