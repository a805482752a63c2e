//! Resolves pretrained model identifiers to files on disk.
//!
//! A model is a directory holding an ONNX export plus the tokenizer and model
//! JSON files. Local directories are preferred; otherwise files are fetched
//! from the Hugging Face Hub and cached in its usual cache directory.

use std::path::{Path, PathBuf};

use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};

use super::model::MmsError;

/// Places an ONNX export is looked for, in order.
const ONNX_CANDIDATES: &[&str] = &["model.onnx", "onnx/model.onnx"];
const VOCAB_FILE: &str = "vocab.json";
const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";
const CONFIG_FILE: &str = "config.json";

/// Files making up one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub onnx: PathBuf,
    pub vocab: PathBuf,
    pub tokenizer_config: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Where to look for models.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Directory holding `<owner>/<name>/` model folders.
    pub models_dir: Option<PathBuf>,
    /// Never contact the Hub.
    pub offline: bool,
    /// Hub revision (branch, tag or commit).
    pub revision: Option<String>,
}

/// Find the files for `model_id`.
///
/// `model_id` may be a directory path, a folder under
/// [`ResolveOptions::models_dir`], or a Hub repository id.
pub fn resolve_model_files(model_id: &str, options: &ResolveOptions) -> Result<ModelFiles, MmsError> {
    let direct = Path::new(model_id);
    if direct.is_dir() {
        return files_in_dir(direct);
    }

    if let Some(models_dir) = &options.models_dir {
        let local = models_dir.join(model_id);
        if local.is_dir() {
            return files_in_dir(&local);
        }
        log::debug!("{} not found locally", local.display());
    }

    if options.offline {
        return Err(MmsError::Download(format!(
            "'{model_id}' is not available locally and offline mode is on"
        )));
    }

    download_from_hub(model_id, options.revision.as_deref())
}

/// Collect model files from a local directory.
fn files_in_dir(dir: &Path) -> Result<ModelFiles, MmsError> {
    let onnx = find_onnx_file(dir)?;

    let vocab = dir.join(VOCAB_FILE);
    if !vocab.exists() {
        return Err(MmsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{VOCAB_FILE} not found in {}", dir.display()),
        )));
    }

    let optional = |name: &str| Some(dir.join(name)).filter(|p| p.exists());
    Ok(ModelFiles {
        onnx,
        vocab,
        tokenizer_config: optional(TOKENIZER_CONFIG_FILE),
        config: optional(CONFIG_FILE),
    })
}

/// Prefer the known export locations, then fall back to the first `.onnx`
/// file in the directory.
fn find_onnx_file(dir: &Path) -> Result<PathBuf, MmsError> {
    for candidate in ONNX_CANDIDATES {
        let path = dir.join(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("onnx") {
            log::info!("Using ONNX file: {}", path.display());
            return Ok(path);
        }
    }

    Err(MmsError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("No .onnx file found in {}", dir.display()),
    )))
}

fn download_from_hub(model_id: &str, revision: Option<&str>) -> Result<ModelFiles, MmsError> {
    if model_id.split('/').count() != 2 {
        return Err(MmsError::Download(format!(
            "'{model_id}' is neither a local directory nor an owner/name repository id"
        )));
    }

    // HF_TOKEN enables gated or private repositories.
    let token = std::env::var("HF_TOKEN").ok();
    let api = ApiBuilder::new()
        .with_token(token)
        .build()
        .map_err(|e| MmsError::Download(e.to_string()))?;

    let repo = match revision {
        Some(rev) => Repo::with_revision(model_id.to_string(), RepoType::Model, rev.to_string()),
        None => Repo::model(model_id.to_string()),
    };
    let api_repo = api.repo(repo);

    log::info!("Fetching {model_id} from the Hugging Face Hub");
    let mut onnx = None;
    let mut last_err = None;
    for candidate in ONNX_CANDIDATES {
        match api_repo.get(candidate) {
            Ok(path) => {
                onnx = Some(path);
                break;
            }
            Err(e) => last_err = Some(e.to_string()),
        }
    }
    let onnx = onnx.ok_or_else(|| {
        MmsError::Download(format!(
            "{model_id} has no ONNX export ({})",
            last_err.unwrap_or_default()
        ))
    })?;

    let vocab = api_repo
        .get(VOCAB_FILE)
        .map_err(|e| MmsError::Download(format!("{model_id}/{VOCAB_FILE}: {e}")))?;

    let optional = |name: &str| match api_repo.get(name) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("{model_id}/{name} unavailable: {e}");
            None
        }
    };

    Ok(ModelFiles {
        onnx,
        vocab,
        tokenizer_config: optional(TOKENIZER_CONFIG_FILE),
        config: optional(CONFIG_FILE),
    })
}
