#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mms_tts_rs::{
    cache::ModelCache,
    language::LanguageRegistry,
    service::{ServiceConfig, TtsService},
    ModelLoader, SynthesisEngine, TtsError,
};

pub const SAMPLE_RATE: u32 = 16_000;

/// Emits 100 samples per input character.
pub struct FakeEngine;

impl SynthesisEngine for FakeEngine {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn generate_waveform(&self, text: &str) -> Result<Vec<f32>, TtsError> {
        if text.contains('\u{1F600}') {
            return Err(TtsError::Inference("unsupported symbol".to_string()));
        }
        Ok(vec![0.5; 100 * text.chars().count()])
    }
}

/// Counts constructions; takes a while so concurrent callers overlap.
#[derive(Clone, Default)]
pub struct FakeLoader {
    pub loads: Arc<AtomicUsize>,
}

impl FakeLoader {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ModelLoader for FakeLoader {
    fn load(&self, model_id: &str) -> Result<Arc<dyn SynthesisEngine>, TtsError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if model_id.contains("missing") {
            return Err(TtsError::model_load(model_id, "repository not found"));
        }
        std::thread::sleep(Duration::from_millis(100));
        Ok(Arc::new(FakeEngine))
    }
}

pub fn registry() -> LanguageRegistry {
    let mut registry = LanguageRegistry::default();
    registry.insert("broken".into(), "facebook/mms-tts-missing");
    registry
}

pub fn service(dir: &Path, loader: FakeLoader) -> TtsService {
    let cache = ModelCache::new(Box::new(loader), registry());
    let config = ServiceConfig {
        output_path: dir.join("tts_output.wav"),
        default_language: "english".into(),
    };
    TtsService::new(Arc::new(cache), config)
}
