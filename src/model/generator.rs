use burn::nn::conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, PaddingConfig2d};
use burn::prelude::*;
use burn::tensor::activation::{relu, tanh};

use crate::dataset::batch::CHANNELS;

/// Conv → batch norm → ReLU.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv: Conv2d<B>,
    norm: BatchNorm<B, 2>,
}

impl<B: Backend> ConvBlock<B> {
    fn new(
        channels: [usize; 2],
        kernel: usize,
        stride: usize,
        device: &B::Device,
    ) -> Self {
        let padding = kernel / 2;
        Self {
            conv: Conv2dConfig::new(channels, [kernel, kernel])
                .with_stride([stride, stride])
                .with_padding(PaddingConfig2d::Explicit(padding, padding))
                .init(device),
            norm: BatchNormConfig::new(channels[1]).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        relu(self.norm.forward(self.conv.forward(x)))
    }
}

/// Two 3×3 convolutions with an identity shortcut.
#[derive(Module, Debug)]
pub struct ResidualBlock<B: Backend> {
    conv1: Conv2d<B>,
    norm1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    norm2: BatchNorm<B, 2>,
}

impl<B: Backend> ResidualBlock<B> {
    fn new(channels: usize, device: &B::Device) -> Self {
        let conv = || {
            Conv2dConfig::new([channels, channels], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device)
        };
        Self {
            conv1: conv(),
            norm1: BatchNormConfig::new(channels).init(device),
            conv2: conv(),
            norm2: BatchNormConfig::new(channels).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let y = relu(self.norm1.forward(self.conv1.forward(x.clone())));
        let y = self.norm2.forward(self.conv2.forward(y));
        x + y
    }
}

/// Transposed 3×3 stride-2 convolution (doubles the resolution), a 3×3
/// convolution, batch norm, ReLU.
#[derive(Module, Debug)]
pub struct UpBlock<B: Backend> {
    up: ConvTranspose2d<B>,
    conv: Conv2d<B>,
    norm: BatchNorm<B, 2>,
}

impl<B: Backend> UpBlock<B> {
    fn new(channels: [usize; 2], device: &B::Device) -> Self {
        Self {
            up: ConvTranspose2dConfig::new(channels, [3, 3])
                .with_stride([2, 2])
                .with_padding([1, 1])
                .with_padding_out([1, 1])
                .init(device),
            conv: Conv2dConfig::new([channels[1], channels[1]], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            norm: BatchNormConfig::new(channels[1]).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        relu(self.norm.forward(self.conv.forward(self.up.forward(x))))
    }
}

#[derive(Config, Debug)]
pub struct GeneratorConfig {
    #[config(default = 64)]
    pub base_channels: usize,
    #[config(default = 8)]
    pub residual_blocks: usize,
}

/// Image-to-image generator: flat 7×7 conv, two stride-2 downsampling
/// stages, a stack of residual blocks, two upsampling stages and a 7×7
/// output conv squashed to [-1, 1]. Input sides must be divisible by 4.
#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    flat: ConvBlock<B>,
    down1: ConvBlock<B>,
    down1_conv: ConvBlock<B>,
    down2: ConvBlock<B>,
    down2_conv: ConvBlock<B>,
    residuals: Vec<ResidualBlock<B>>,
    up1: UpBlock<B>,
    up2: UpBlock<B>,
    output: Conv2d<B>,
}

impl GeneratorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Generator<B> {
        let c = self.base_channels;
        Generator {
            flat: ConvBlock::new([CHANNELS, c], 7, 1, device),
            down1: ConvBlock::new([c, c * 2], 3, 2, device),
            down1_conv: ConvBlock::new([c * 2, c * 2], 3, 1, device),
            down2: ConvBlock::new([c * 2, c * 4], 3, 2, device),
            down2_conv: ConvBlock::new([c * 4, c * 4], 3, 1, device),
            residuals: (0..self.residual_blocks)
                .map(|_| ResidualBlock::new(c * 4, device))
                .collect(),
            up1: UpBlock::new([c * 4, c * 2], device),
            up2: UpBlock::new([c * 2, c], device),
            output: Conv2dConfig::new([c, CHANNELS], [7, 7])
                .with_padding(PaddingConfig2d::Explicit(3, 3))
                .init(device),
        }
    }
}

impl<B: Backend> Generator<B> {
    /// `[N, 3, H, W]` in [-1, 1] to `[N, 3, H, W]` in [-1, 1].
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.flat.forward(images);
        let x = self.down1_conv.forward(self.down1.forward(x));
        let x = self.down2_conv.forward(self.down2.forward(x));
        let x = self
            .residuals
            .iter()
            .fold(x, |x, block| block.forward(x));
        let x = self.up2.forward(self.up1.forward(x));
        tanh(self.output.forward(x))
    }
}
