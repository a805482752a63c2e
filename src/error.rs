/// Errors surfaced by the text-to-speech pipeline.
///
/// Every variant is reported back to the caller; none of them is fatal to the
/// serving process.
#[derive(thiserror::Error, Debug)]
pub enum TtsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to load model '{model_id}': {reason}")]
    ModelLoad { model_id: String, reason: String },
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TtsError {
    pub fn model_load(model_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::ModelLoad {
            model_id: model_id.into(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::ModelLoad { .. } => "model_load",
            Self::Inference(_) => "inference",
            Self::Io(_) => "io",
        }
    }
}

impl From<hound::Error> for TtsError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => Self::Io(e),
            other => Self::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, other)),
        }
    }
}
