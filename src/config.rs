//! Command line and environment configuration.
//!
//! Every option can also be set through an `MMS_TTS_*` environment variable.

use std::path::PathBuf;

use clap::Args;

use crate::language::{parse_override, LanguageModelKey, LanguageRegistry, DEFAULT_LANGUAGE};
use crate::service::{ServiceConfig, DEFAULT_OUTPUT_PATH};

/// Model selection and loading options shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Language used when a request does not name one
    #[arg(long, env = "MMS_TTS_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Map a language to a model id or directory, e.g. `odia=facebook/mms-tts-ory`
    #[arg(long = "model", value_name = "KEY=MODEL_ID", value_parser = parse_override)]
    pub models: Vec<(LanguageModelKey, String)>,

    /// Directory holding `<owner>/<name>/` ONNX model folders
    #[arg(long, env = "MMS_TTS_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Only use local model folders, never download
    #[arg(long, env = "MMS_TTS_OFFLINE")]
    pub offline: bool,

    /// Hugging Face Hub revision to download
    #[arg(long, env = "MMS_TTS_REVISION")]
    pub revision: Option<String>,

    /// CPU threads per inference (default: all cores)
    #[arg(long, env = "MMS_TTS_THREADS")]
    pub threads: Option<usize>,
}

impl ModelArgs {
    /// Built-in languages plus any `--model` overrides.
    pub fn registry(&self) -> LanguageRegistry {
        let mut registry = LanguageRegistry::default();
        for (key, model_id) in &self.models {
            registry.insert(key.clone(), model_id.clone());
        }
        registry
    }

    pub fn default_language(&self) -> LanguageModelKey {
        LanguageModelKey::new(&self.language)
    }

    #[cfg(feature = "mms")]
    pub fn mms_params(&self) -> crate::engines::mms::MmsModelParams {
        crate::engines::mms::MmsModelParams {
            num_threads: self.threads,
            models_dir: self.models_dir.clone(),
            offline: self.offline,
            revision: self.revision.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host to bind
    #[arg(long, env = "MMS_TTS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "MMS_TTS_PORT", default_value_t = 8000)]
    pub port: u16,

    /// WAV file written by every conversion
    #[arg(long, env = "MMS_TTS_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Report failures with 4xx/5xx status codes instead of always 200
    #[arg(long, env = "MMS_TTS_STRICT_STATUS")]
    pub strict_status: bool,

    /// Load the default language's model before accepting requests
    #[arg(long)]
    pub preload: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

impl ServeArgs {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            output_path: self.output.clone(),
            default_language: self.model.default_language(),
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            strict_status: self.strict_status,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Text to speak
    #[arg(long, short)]
    pub text: String,

    /// Output WAV file
    #[arg(long, short, env = "MMS_TTS_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,
}

impl GenerateArgs {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            output_path: self.output.clone(),
            default_language: self.model.default_language(),
        }
    }
}

/// HTTP front end settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// When false every `/tts` response is HTTP 200 and failures are only
    /// visible in the body.
    pub strict_status: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            strict_status: false,
        }
    }
}
