pub mod feature_extractor;
pub mod generator;
pub mod loss;

pub use feature_extractor::{FeatureExtractorConfig, FixedFeatureExtractor};
pub use generator::{Generator, GeneratorConfig};
pub use loss::ContentLoss;

/// Serializes tests that seed or draw from the backend's process-wide RNG.
#[cfg(test)]
pub(crate) fn lock_backend_rng() -> std::sync::MutexGuard<'static, ()> {
    static BACKEND_RNG: std::sync::Mutex<()> = std::sync::Mutex::new(());
    BACKEND_RNG.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
