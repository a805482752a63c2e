use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::model::MmsError;

/// Id interleaved between characters when `add_blank` is set.
const BLANK_ID: u32 = 0;

/// Settings read from `tokenizer_config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerConfig {
    #[serde(default = "default_true")]
    pub add_blank: bool,
    #[serde(default = "default_true")]
    pub normalize: bool,
    /// Stands in for unknown characters when `normalize` is off.
    #[serde(default = "default_unk_token")]
    pub unk_token: String,
    #[serde(default)]
    pub is_uroman: bool,
    #[serde(default)]
    pub phonemize: bool,
}

fn default_true() -> bool {
    true
}

fn default_unk_token() -> String {
    "<unk>".to_string()
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            add_blank: true,
            normalize: true,
            unk_token: default_unk_token(),
            is_uroman: false,
            phonemize: false,
        }
    }
}

/// Tokenizer output, in the narrow id type the vocabulary uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl Encoding {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Character-level tokenizer shipped with MMS-TTS (VITS) checkpoints.
pub struct VitsTokenizer {
    vocab: HashMap<String, u32>,
    config: TokenizerConfig,
}

impl VitsTokenizer {
    pub fn new(vocab: HashMap<String, u32>, config: TokenizerConfig) -> Self {
        Self { vocab, config }
    }

    /// Load `vocab.json` and, when present, `tokenizer_config.json`.
    pub fn load(vocab_path: &Path, config_path: Option<&Path>) -> Result<Self, MmsError> {
        let content = std::fs::read_to_string(vocab_path)?;
        let vocab: HashMap<String, u32> = serde_json::from_str(&content)
            .map_err(|e| MmsError::Config(format!("Failed to parse vocab.json: {e}")))?;
        if vocab.is_empty() {
            return Err(MmsError::Config("vocab.json is empty".to_string()));
        }

        let config = match config_path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content).map_err(|e| {
                    MmsError::Config(format!("Failed to parse tokenizer_config.json: {e}"))
                })?
            }
            _ => {
                log::warn!("tokenizer_config.json not found, using VITS defaults");
                TokenizerConfig::default()
            }
        };

        if config.is_uroman {
            log::warn!(
                "This model expects romanized (uroman) input; native script text may be dropped"
            );
        }
        if config.phonemize {
            log::warn!("This model expects phonemized input; raw text is passed through");
        }

        Ok(Self::new(vocab, config))
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Encode text into token ids.
    ///
    /// With `normalize` on, characters outside the vocabulary are dropped
    /// and surrounding whitespace is stripped from what remains. With it off,
    /// unknown characters map to the unknown token, or are dropped when the
    /// vocabulary has none. Returns an empty encoding when nothing remains.
    pub fn encode(&self, text: &str) -> Encoding {
        let ids: Vec<u32> = if self.config.normalize {
            let filtered: String = self
                .normalize(text)
                .chars()
                .filter(|&ch| self.lookup(ch).is_some())
                .collect();
            filtered.trim().chars().filter_map(|ch| self.lookup(ch)).collect()
        } else {
            let unk = self.vocab.get(&self.config.unk_token).copied();
            text.chars()
                .filter_map(|ch| self.lookup(ch).or(unk))
                .collect()
        };

        if ids.is_empty() {
            return Encoding {
                input_ids: Vec::new(),
                attention_mask: Vec::new(),
            };
        }

        let input_ids = if self.config.add_blank {
            intersperse(&ids, BLANK_ID)
        } else {
            ids
        };
        let attention_mask = vec![1; input_ids.len()];
        Encoding {
            input_ids,
            attention_mask,
        }
    }

    fn lookup(&self, ch: char) -> Option<u32> {
        let mut buf = [0u8; 4];
        self.vocab.get(&*ch.encode_utf8(&mut buf)).copied()
    }

    /// Keep vocabulary characters verbatim and lower-case everything else.
    ///
    /// Upper-case letters that are themselves in the vocabulary survive.
    fn normalize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if self.lookup(ch).is_some() {
                out.push(ch);
            } else {
                out.extend(ch.to_lowercase());
            }
        }
        out
    }
}

/// `[a, b]` becomes `[blank, a, blank, b, blank]`.
fn intersperse(ids: &[u32], blank: u32) -> Vec<u32> {
    let mut out = vec![blank; ids.len() * 2 + 1];
    for (i, &id) in ids.iter().enumerate() {
        out[i * 2 + 1] = id;
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{intersperse, TokenizerConfig, VitsTokenizer};

    fn vocab() -> HashMap<String, u32> {
        [("_", 0), (" ", 1), ("h", 2), ("e", 3), ("l", 4), ("o", 5), ("ન", 6), ("મ", 7), ("i", 8)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn intersperses_blanks() {
        assert_eq!(intersperse(&[7, 8], 0), vec![0, 7, 0, 8, 0]);
    }

    #[test]
    fn lowercases_and_adds_blanks() {
        let tok = VitsTokenizer::new(vocab(), TokenizerConfig::default());
        let enc = tok.encode("Hello");
        assert_eq!(enc.input_ids, vec![0, 2, 0, 3, 0, 4, 0, 4, 0, 5, 0]);
        assert_eq!(enc.attention_mask, vec![1; 11]);
    }

    #[test]
    fn drops_out_of_vocabulary_characters() {
        let config = TokenizerConfig {
            add_blank: false,
            ..Default::default()
        };
        let tok = VitsTokenizer::new(vocab(), config);
        assert_eq!(tok.encode("  નમ!?  ").input_ids, vec![6, 7]);
    }

    #[test]
    fn unsupported_script_encodes_to_nothing() {
        let tok = VitsTokenizer::new(vocab(), TokenizerConfig::default());
        let enc = tok.encode("ਪੰਜਾਬੀ");
        assert!(enc.is_empty());
        assert!(enc.attention_mask.is_empty());
    }

    #[test]
    fn strips_whitespace_left_by_dropped_punctuation() {
        let config = TokenizerConfig {
            add_blank: false,
            ..Default::default()
        };
        let tok = VitsTokenizer::new(vocab(), config);
        assert_eq!(tok.encode("hi !").input_ids, vec![2, 8]);
        assert_eq!(tok.encode("¡ hi").input_ids, vec![2, 8]);
        assert_eq!(tok.encode("hi , hello").input_ids, vec![2, 8, 1, 1, 2, 3, 4, 4, 5]);
    }

    #[test]
    fn lowercases_only_characters_missing_from_vocab() {
        let mut vocab = vocab();
        vocab.insert("H".to_string(), 9);
        let config = TokenizerConfig {
            add_blank: false,
            ..Default::default()
        };
        let tok = VitsTokenizer::new(vocab, config);
        assert_eq!(tok.encode("HeLLo").input_ids, vec![9, 3, 4, 4, 5]);
    }

    #[test]
    fn unknown_characters_map_to_unk_without_normalization() {
        let mut with_unk = vocab();
        with_unk.insert("<unk>".to_string(), 9);
        let config = TokenizerConfig {
            add_blank: false,
            normalize: false,
            ..Default::default()
        };

        let tok = VitsTokenizer::new(with_unk, config.clone());
        assert_eq!(tok.encode("Hi!").input_ids, vec![9, 8, 9]);

        let tok = VitsTokenizer::new(vocab(), config);
        assert_eq!(tok.encode("Hi!").input_ids, vec![8]);
    }

    #[test]
    fn loads_from_files_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let vocab_path = dir.path().join("vocab.json");
        std::fs::write(&vocab_path, r#"{"_": 0, "a": 1, "b": 2}"#).unwrap();
        let config_path = dir.path().join("tokenizer_config.json");
        std::fs::write(&config_path, r#"{"add_blank": false, "pad_token": "_"}"#).unwrap();

        let tok = VitsTokenizer::load(&vocab_path, Some(&config_path)).unwrap();
        assert_eq!(tok.vocab_size(), 3);
        assert_eq!(tok.encode("AB").input_ids, vec![1, 2]);

        let tok = VitsTokenizer::load(&vocab_path, None).unwrap();
        assert_eq!(tok.encode("ab").input_ids, vec![0, 1, 0, 2, 0]);
    }
}
