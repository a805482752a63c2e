use std::path::Path;

use ndarray::Array2;
use ort::execution_providers::CPUExecutionProvider;
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;
use parking_lot::Mutex;
use serde::Deserialize;

use super::download::ModelFiles;
use super::tokenizer::{Encoding, VitsTokenizer};

/// Sample rate VITS configs default to when `config.json` omits it.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

#[derive(thiserror::Error, Debug)]
pub enum MmsError {
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("Invalid model config: {0}")]
    Config(String),
    #[error("Model download failed: {0}")]
    Download(String),
    #[error("None of the characters in the input are in the model vocabulary")]
    NoTokens,
    #[error("Model returned no waveform output")]
    NoOutput,
}

#[derive(Debug, Deserialize)]
struct ModelConfig {
    sampling_rate: Option<u32>,
}

/// An MMS-TTS checkpoint exported to ONNX, together with its tokenizer.
pub struct MmsModel {
    session: Mutex<Session>,
    tokenizer: VitsTokenizer,
    sample_rate: u32,
    /// Some exports take only `input_ids`.
    takes_attention_mask: bool,
}

impl MmsModel {
    pub fn load(files: &ModelFiles, num_threads: Option<usize>) -> Result<Self, MmsError> {
        log::info!("Loading MMS model from {}", files.onnx.display());

        let session = init_session(&files.onnx, num_threads)?;
        let takes_attention_mask = detect_attention_mask(&session);
        log::debug!("Detected: attention_mask input={takes_attention_mask}");

        let tokenizer = VitsTokenizer::load(&files.vocab, files.tokenizer_config.as_deref())?;
        let sample_rate = match files.config.as_deref() {
            Some(path) => read_sample_rate(path)?,
            None => {
                log::warn!("config.json not found, assuming {DEFAULT_SAMPLE_RATE}Hz");
                DEFAULT_SAMPLE_RATE
            }
        };

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            sample_rate,
            takes_attention_mask,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn tokenizer(&self) -> &VitsTokenizer {
        &self.tokenizer
    }

    /// Tokenize `text`, run one forward pass and return the flattened waveform.
    pub fn synthesize_text(&self, text: &str) -> Result<Vec<f32>, MmsError> {
        let encoding = self.tokenizer.encode(text);
        if encoding.is_empty() {
            return Err(MmsError::NoTokens);
        }
        log::debug!("Encoded {} chars into {} tokens", text.chars().count(), encoding.len());

        let (input_ids, attention_mask) = widen_encoding(&encoding)?;

        let mut session = self.session.lock();
        let output = if self.takes_attention_mask {
            let inputs = inputs![
                "input_ids" => TensorRef::from_array_view(input_ids.view())?,
                "attention_mask" => TensorRef::from_array_view(attention_mask.view())?,
            ];
            session.run(inputs)?
        } else {
            let inputs = inputs![
                "input_ids" => TensorRef::from_array_view(input_ids.view())?,
            ];
            session.run(inputs)?
        };

        // First output is the waveform, shaped [batch, samples].
        let first_output = output.iter().next().ok_or(MmsError::NoOutput)?;
        let waveform = first_output.1.try_extract_array::<f32>()?;

        Ok(waveform.iter().copied().collect())
    }
}

/// Build `[1, len]` i64 tensors from a tokenizer encoding.
///
/// Applied before every forward pass: some language exports reject the
/// narrower integer width the tokenizer works in.
pub fn widen_encoding(encoding: &Encoding) -> Result<(Array2<i64>, Array2<i64>), MmsError> {
    let len = encoding.input_ids.len();
    let ids: Vec<i64> = encoding.input_ids.iter().map(|&id| i64::from(id)).collect();
    let mask: Vec<i64> = encoding
        .attention_mask
        .iter()
        .map(|&m| i64::from(m))
        .collect();
    Ok((
        Array2::from_shape_vec((1, len), ids)?,
        Array2::from_shape_vec((1, mask.len()), mask)?,
    ))
}

fn init_session(onnx_path: &Path, num_threads: Option<usize>) -> Result<Session, MmsError> {
    let providers = vec![CPUExecutionProvider::default().build()];

    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_execution_providers(providers)?;

    if let Some(threads) = num_threads {
        builder = builder.with_intra_threads(threads)?;
    }

    Ok(builder.commit_from_file(onnx_path)?)
}

fn detect_attention_mask(session: &Session) -> bool {
    session
        .inputs()
        .iter()
        .any(|input| input.name() == "attention_mask")
}

fn read_sample_rate(config_path: &Path) -> Result<u32, MmsError> {
    let content = std::fs::read_to_string(config_path)?;
    let config: ModelConfig = serde_json::from_str(&content)
        .map_err(|e| MmsError::Config(format!("Failed to parse config.json: {e}")))?;
    match config.sampling_rate {
        Some(0) => Err(MmsError::Config("sampling_rate must be positive".to_string())),
        Some(rate) => Ok(rate),
        None => {
            log::warn!("config.json has no sampling_rate, assuming {DEFAULT_SAMPLE_RATE}Hz");
            Ok(DEFAULT_SAMPLE_RATE)
        }
    }
}
