//! Process-wide memoization of loaded models.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::Mutex;

use crate::language::{LanguageModelKey, LanguageRegistry};
use crate::{ModelLoader, SynthesisEngine, TtsError};

/// One language's model. `model` is readable without blocking; `init` is
/// held only while that model is being constructed.
#[derive(Default)]
struct Slot {
    model: OnceLock<Arc<dyn SynthesisEngine>>,
    init: Mutex<()>,
}

/// Holds at most one loaded model per language key.
///
/// The outer map lock is only held long enough to find or create the key's
/// slot. Construction happens under the slot's init lock, so concurrent first
/// requests for the same key load once while other keys load in parallel.
/// Lookups of loaded models and introspection never wait on a load.
/// Entries are never evicted.
pub struct ModelCache {
    loader: Box<dyn ModelLoader>,
    registry: LanguageRegistry,
    slots: Mutex<HashMap<LanguageModelKey, Arc<Slot>>>,
}

impl ModelCache {
    pub fn new(loader: Box<dyn ModelLoader>, registry: LanguageRegistry) -> Self {
        Self {
            loader,
            registry,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Return the model for `key`, loading it on first use.
    ///
    /// Later calls return the same `Arc`. A failed load leaves the slot empty
    /// and the next call tries again.
    pub fn get_or_load(&self, key: &LanguageModelKey) -> Result<Arc<dyn SynthesisEngine>, TtsError> {
        let model_id = self.registry.model_id(key).ok_or_else(|| {
            TtsError::model_load(
                key.as_str(),
                "no pretrained model is configured for this language",
            )
        })?;

        let slot = self.slot(key);
        if let Some(model) = slot.model.get() {
            return Ok(Arc::clone(model));
        }

        let _init = slot.init.lock();
        if let Some(model) = slot.model.get() {
            return Ok(Arc::clone(model));
        }

        log::info!("Loading model {model_id} for '{key}'");
        let start = Instant::now();
        let model = self.loader.load(model_id).map_err(|e| {
            log::error!("Loading {model_id} failed: {e}");
            e
        })?;
        log::info!(
            "Model {model_id} ready in {:.2?} ({}Hz)",
            start.elapsed(),
            model.sample_rate()
        );

        Ok(Arc::clone(slot.model.get_or_init(|| model)))
    }

    /// True when a model for `key` has been loaded.
    pub fn is_loaded(&self, key: &LanguageModelKey) -> bool {
        self.slots
            .lock()
            .get(key)
            .is_some_and(|slot| slot.model.get().is_some())
    }

    pub fn loaded_count(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.model.get().is_some())
            .count()
    }

    fn slot(&self, key: &LanguageModelKey) -> Arc<Slot> {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::ModelCache;
    use crate::language::LanguageRegistry;
    use crate::{ModelLoader, SynthesisEngine, TtsError};

    struct Silence;

    impl SynthesisEngine for Silence {
        fn sample_rate(&self) -> u32 {
            16_000
        }

        fn generate_waveform(&self, _text: &str) -> Result<Vec<f32>, TtsError> {
            Ok(vec![0.0; 16])
        }
    }

    #[derive(Clone, Default)]
    struct CountingLoader {
        loads: Arc<AtomicUsize>,
        fail_first: Arc<AtomicUsize>,
    }

    impl ModelLoader for CountingLoader {
        fn load(&self, model_id: &str) -> Result<Arc<dyn SynthesisEngine>, TtsError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(TtsError::model_load(model_id, "network unreachable"));
            }
            // Widen the race window for the concurrency test.
            thread::sleep(Duration::from_millis(50));
            Ok(Arc::new(Silence))
        }
    }

    #[test]
    fn loads_once_per_key() {
        let loader = CountingLoader::default();
        let cache = ModelCache::new(Box::new(loader.clone()), LanguageRegistry::default());

        let first = cache.get_or_load(&"hindi".into()).unwrap();
        let second = cache.get_or_load(&"Hindi".into()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert!(cache.is_loaded(&"hindi".into()));
        assert!(!cache.is_loaded(&"tamil".into()));
    }

    #[test]
    fn distinct_keys_load_distinct_models() {
        let loader = CountingLoader::default();
        let cache = ModelCache::new(Box::new(loader.clone()), LanguageRegistry::default());

        cache.get_or_load(&"hindi".into()).unwrap();
        cache.get_or_load(&"tamil".into()).unwrap();

        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.loaded_count(), 2);
    }

    #[test]
    fn unknown_key_fails_without_loading() {
        let loader = CountingLoader::default();
        let cache = ModelCache::new(Box::new(loader.clone()), LanguageRegistry::default());

        let err = cache.get_or_load(&"klingon".into()).err().unwrap();
        assert!(matches!(err, TtsError::ModelLoad { .. }));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_load_is_retried_on_next_call() {
        let loader = CountingLoader::default();
        loader.fail_first.store(1, Ordering::SeqCst);
        let cache = ModelCache::new(Box::new(loader.clone()), LanguageRegistry::default());

        assert!(cache.get_or_load(&"english".into()).is_err());
        assert!(!cache.is_loaded(&"english".into()));

        assert!(cache.get_or_load(&"english".into()).is_ok());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_first_requests_construct_once() {
        let loader = CountingLoader::default();
        let cache = Arc::new(ModelCache::new(
            Box::new(loader.clone()),
            LanguageRegistry::default(),
        ));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_load(&"gujarati".into()).map(|_| ())
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    /// Blocks loading `gated_id` until `release` receives a message.
    struct GatedLoader {
        gated_id: &'static str,
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl ModelLoader for GatedLoader {
        fn load(&self, model_id: &str) -> Result<Arc<dyn SynthesisEngine>, TtsError> {
            if model_id == self.gated_id {
                let _ = self.entered.lock().send(());
                let _ = self.release.lock().recv();
            }
            Ok(Arc::new(Silence))
        }
    }

    #[test]
    fn slow_load_does_not_block_other_keys_or_introspection() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let loader = GatedLoader {
            gated_id: "facebook/mms-tts-guj",
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let cache = Arc::new(ModelCache::new(Box::new(loader), LanguageRegistry::default()));
        cache.get_or_load(&"hindi".into()).unwrap();

        let slow = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.get_or_load(&"gujarati".into()).map(|_| ()))
        };
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let count = cache.loaded_count();
                let loading = cache.is_loaded(&"gujarati".into());
                let cached = cache.get_or_load(&"hindi".into()).is_ok();
                let other = cache.get_or_load(&"tamil".into()).is_ok();
                let _ = done_tx.send((count, loading, cached, other));
            });
        }
        let outcome = done_rx.recv_timeout(Duration::from_secs(2));

        release_tx.send(()).unwrap();
        slow.join().unwrap().unwrap();

        assert_eq!(outcome.expect("lookups stalled behind a load"), (1, false, true, true));
        assert_eq!(cache.loaded_count(), 3);
    }
}
