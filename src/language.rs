//! Language keys and the pretrained model each one maps to.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Built-in languages and their MMS-TTS checkpoints.
pub const DEFAULT_LANGUAGES: &[(&str, &str)] = &[
    ("gujarati", "facebook/mms-tts-guj"),
    ("hindi", "facebook/mms-tts-hin"),
    ("english", "facebook/mms-tts-eng"),
    ("marathi", "facebook/mms-tts-mar"),
    ("bengali", "facebook/mms-tts-ben"),
    ("tamil", "facebook/mms-tts-tam"),
    ("telugu", "facebook/mms-tts-tel"),
    ("kannada", "facebook/mms-tts-kan"),
    ("punjabi", "facebook/mms-tts-pan"),
    ("malayalam", "facebook/mms-tts-mal"),
];

pub const DEFAULT_LANGUAGE: &str = "gujarati";

/// Identifies which pretrained model a request wants.
///
/// Keys are compared after trimming and lower-casing, so `"Hindi"` and
/// `" hindi "` select the same model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LanguageModelKey(String);

impl LanguageModelKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageModelKey {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl From<String> for LanguageModelKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for LanguageModelKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<LanguageModelKey> for String {
    fn from(value: LanguageModelKey) -> Self {
        value.0
    }
}

impl fmt::Display for LanguageModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Mapping from language keys to pretrained model identifiers.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    models: BTreeMap<LanguageModelKey, String>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_LANGUAGES.iter().copied())
    }
}

impl LanguageRegistry {
    /// An empty registry; every lookup fails until entries are added.
    pub fn empty() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut registry = Self::empty();
        for (key, model_id) in pairs {
            registry.insert(LanguageModelKey::new(key), model_id);
        }
        registry
    }

    /// Add or replace the model used for `key`.
    pub fn insert(&mut self, key: LanguageModelKey, model_id: impl Into<String>) {
        let model_id = model_id.into();
        if let Some(previous) = self.models.insert(key.clone(), model_id.clone()) {
            log::debug!("Language '{key}' remapped from {previous} to {model_id}");
        }
    }

    /// The pretrained identifier for `key`, if the key is known.
    pub fn model_id(&self, key: &LanguageModelKey) -> Option<&str> {
        self.models.get(key).map(String::as_str)
    }

    /// All known languages in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&LanguageModelKey, &str)> {
        self.models.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Parse a `KEY=MODEL_ID` override as given on the command line.
pub fn parse_override(raw: &str) -> Result<(LanguageModelKey, String), String> {
    let (key, model_id) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=MODEL_ID, got {raw:?}"))?;
    let key = LanguageModelKey::new(key);
    let model_id = model_id.trim();
    if key.as_str().is_empty() || model_id.is_empty() {
        return Err(format!("expected KEY=MODEL_ID, got {raw:?}"));
    }
    Ok((key, model_id.to_string()))
}
