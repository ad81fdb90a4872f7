use anyhow::{anyhow, Result};
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::PaddingConfig2d;
use burn::prelude::*;
use burn::record::DefaultRecorder;
use burn::tensor::activation::relu;
use std::path::Path;

use crate::dataset::batch::CHANNELS;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Module, Debug)]
pub struct VggStage<B: Backend> {
    convs: Vec<Conv2d<B>>,
}

impl<B: Backend> VggStage<B> {
    fn new(channels: [usize; 2], depth: usize, device: &B::Device) -> Self {
        let convs = (0..depth)
            .map(|i| {
                let input = if i == 0 { channels[0] } else { channels[1] };
                Conv2dConfig::new([input, channels[1]], [3, 3])
                    .with_padding(PaddingConfig2d::Explicit(1, 1))
                    .init(device)
            })
            .collect();
        Self { convs }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.convs.iter().fold(x, |x, conv| relu(conv.forward(x)))
    }
}

#[derive(Config, Debug)]
pub struct FeatureExtractorConfig {
    #[config(default = 64)]
    pub base_channels: usize,
    #[config(default = 3)]
    pub stages: usize,
    #[config(default = 2)]
    pub convs_per_stage: usize,
}

/// VGG-style feature extractor used as a fixed perceptual metric.
///
/// Its parameters never require gradients, so gradients flow through it to
/// the generator while the extractor itself stays untouched.
#[derive(Module, Debug)]
pub struct FixedFeatureExtractor<B: Backend> {
    stages: Vec<VggStage<B>>,
    pool: MaxPool2d,
}

impl FeatureExtractorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FixedFeatureExtractor<B> {
        let stages = (0..self.stages)
            .map(|i| {
                let input = if i == 0 {
                    CHANNELS
                } else {
                    self.base_channels << (i - 1)
                };
                VggStage::new([input, self.base_channels << i], self.convs_per_stage, device)
            })
            .collect();
        FixedFeatureExtractor {
            stages,
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
        .no_grad()
    }
}

impl<B: Backend> FixedFeatureExtractor<B> {
    /// Replace the weights with a record saved by burn's `DefaultRecorder`.
    pub fn load_weights(self, path: &Path, device: &B::Device) -> Result<Self> {
        let loaded = self
            .load_file(path.to_path_buf(), &DefaultRecorder::new(), device)
            .map_err(|e| anyhow!("Failed to load feature extractor weights from {:?}: {:?}", path, e))?;
        Ok(loaded.no_grad())
    }

    /// `[N, 3, H, W]` images in [-1, 1] to the last stage's activations.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let device = images.device();
        let mean = Tensor::<B, 1>::from_floats(IMAGENET_MEAN, &device).reshape([1, CHANNELS, 1, 1]);
        let std = Tensor::<B, 1>::from_floats(IMAGENET_STD, &device).reshape([1, CHANNELS, 1, 1]);
        let x = ((images + 1.0) / 2.0 - mean) / std;

        let last = self.stages.len().saturating_sub(1);
        self.stages.iter().enumerate().fold(x, |x, (i, stage)| {
            let x = stage.forward(x);
            if i < last {
                self.pool.forward(x)
            } else {
                x
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lock_backend_rng;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn small() -> FeatureExtractorConfig {
        FeatureExtractorConfig::new()
            .with_base_channels(4)
            .with_stages(3)
            .with_convs_per_stage(1)
    }

    #[test]
    fn test_feature_shape() {
        let _rng = lock_backend_rng();
        let device = Default::default();
        let extractor = small().init::<TestBackend>(&device);
        let features = extractor.forward(Tensor::zeros([2, 3, 16, 16], &device));
        // two pools between three stages; last stage has 4 << 2 channels
        assert_eq!(features.dims(), [2, 16, 4, 4]);
    }

    #[test]
    fn test_weights_round_trip_through_record() {
        let _rng = lock_backend_rng();
        let device = Default::default();
        let tmp_dir = std::env::temp_dir().join("toonkit_extractor_record");
        std::fs::create_dir_all(&tmp_dir).unwrap();
        let path = tmp_dir.join("vgg");

        let saved = small().init::<TestBackend>(&device);
        saved
            .clone()
            .save_file(path.clone(), &DefaultRecorder::new())
            .unwrap();

        let loaded = small()
            .init::<TestBackend>(&device)
            .load_weights(&path, &device)
            .unwrap();

        let input = Tensor::<TestBackend, 4>::ones([1, 3, 8, 8], &device);
        let a = saved.forward(input.clone()).into_data().to_vec::<f32>().unwrap();
        let b = loaded.forward(input).into_data().to_vec::<f32>().unwrap();
        assert_eq!(a, b);
    }
}
