use std::time::Instant;

use crate::{SynthesisEngine, SynthesisResult, TtsError};

/// Reject empty or whitespace-only text.
///
/// There is no length cap and no character-set check; scripts a model cannot
/// handle surface later as [`TtsError::Inference`].
pub fn validate_text(text: &str) -> Result<(), TtsError> {
    if text.trim().is_empty() {
        return Err(TtsError::InvalidInput(
            "text must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Turn text into a raw audio buffer with an already loaded model.
///
/// The waveform is returned as produced: no normalization, no clipping.
pub fn synthesize(text: &str, model: &dyn SynthesisEngine) -> Result<SynthesisResult, TtsError> {
    validate_text(text)?;

    let start = Instant::now();
    let samples = model.generate_waveform(text)?;
    if samples.is_empty() {
        return Err(TtsError::Inference(
            "model produced an empty waveform".to_string(),
        ));
    }

    let result = SynthesisResult {
        samples,
        sample_rate: model.sample_rate(),
    };
    log::debug!(
        "Synthesized {:.2}s of audio in {:.2?}",
        result.duration_secs(),
        start.elapsed()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{synthesize, validate_text};
    use crate::{SynthesisEngine, TtsError};

    struct CountingEngine {
        calls: AtomicUsize,
        output: Vec<f32>,
    }

    impl SynthesisEngine for CountingEngine {
        fn sample_rate(&self) -> u32 {
            16_000
        }

        fn generate_waveform(&self, _text: &str) -> Result<Vec<f32>, TtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    fn engine(output: Vec<f32>) -> CountingEngine {
        CountingEngine {
            calls: AtomicUsize::new(0),
            output,
        }
    }

    #[test]
    fn blank_text_is_rejected() {
        for text in ["", " ", "\n\t  "] {
            assert!(matches!(
                validate_text(text),
                Err(TtsError::InvalidInput(_))
            ));
        }
        assert!(validate_text(" નમસ્તે ").is_ok());
    }

    #[test]
    fn blank_text_never_reaches_the_model() {
        let model = engine(vec![0.1]);
        let err = synthesize("   ", &model).unwrap_err();
        assert!(matches!(err, TtsError::InvalidInput(_)));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn returns_samples_and_model_rate() {
        let model = engine(vec![0.0, 1.5, -2.0]);
        let result = synthesize("Hello", &model).unwrap();
        assert_eq!(result.sample_rate, 16_000);
        // Out-of-range amplitudes pass through untouched.
        assert_eq!(result.samples, vec![0.0, 1.5, -2.0]);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_waveform_is_an_inference_error() {
        let model = engine(Vec::new());
        assert!(matches!(
            synthesize("Hello", &model),
            Err(TtsError::Inference(_))
        ));
    }
}
