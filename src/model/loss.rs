use burn::prelude::*;

use super::feature_extractor::FixedFeatureExtractor;

/// L1 content loss between real images and their reconstructions.
#[derive(Debug)]
pub enum ContentLoss<B: Backend> {
    Pixel,
    Feature(FixedFeatureExtractor<B>),
}

impl<B: Backend> ContentLoss<B> {
    pub fn pixel() -> Self {
        ContentLoss::Pixel
    }

    pub fn feature(extractor: FixedFeatureExtractor<B>) -> Self {
        ContentLoss::Feature(extractor)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ContentLoss::Pixel => "pixel space",
            ContentLoss::Feature(_) => "feature space",
        }
    }

    /// Mean absolute difference; a single-element, non-negative tensor.
    pub fn forward(&self, real: Tensor<B, 4>, generated: Tensor<B, 4>) -> Tensor<B, 1> {
        match self {
            ContentLoss::Pixel => (real - generated).abs().mean(),
            ContentLoss::Feature(extractor) => {
                let real_features = extractor.forward(real);
                let generated_features = extractor.forward(generated);
                (real_features - generated_features).abs().mean()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lock_backend_rng;
    use crate::model::feature_extractor::FeatureExtractorConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_pixel_loss_value() {
        let device = Default::default();
        let real = Tensor::<TestBackend, 4>::zeros([1, 3, 2, 2], &device);
        let generated = Tensor::<TestBackend, 4>::full([1, 3, 2, 2], -0.5, &device);
        let loss: f32 = ContentLoss::pixel().forward(real, generated).into_scalar();
        assert!((loss - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_identical_inputs_have_zero_loss() {
        let _rng = lock_backend_rng();
        let device = Default::default();
        let extractor = FeatureExtractorConfig::new()
            .with_base_channels(4)
            .with_stages(2)
            .init::<TestBackend>(&device);
        let loss = ContentLoss::feature(extractor);
        let images = Tensor::<TestBackend, 4>::random(
            [2, 3, 8, 8],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let value: f32 = loss.forward(images.clone(), images).into_scalar();
        assert!(value.abs() < 1e-6);
    }

    #[test]
    fn test_feature_loss_is_non_negative() {
        let _rng = lock_backend_rng();
        let device = Default::default();
        let extractor = FeatureExtractorConfig::new()
            .with_base_channels(4)
            .with_stages(2)
            .init::<TestBackend>(&device);
        let loss = ContentLoss::feature(extractor);
        let real = Tensor::<TestBackend, 4>::ones([1, 3, 8, 8], &device);
        let generated = Tensor::<TestBackend, 4>::zeros([1, 3, 8, 8], &device);
        let value: f32 = loss.forward(real, generated).into_scalar();
        assert!(value >= 0.0);
        assert_eq!(loss.describe(), "feature space");
    }
}
