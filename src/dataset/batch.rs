use anyhow::{anyhow, bail, Result};
use burn::prelude::*;

pub const CHANNELS: usize = 3;

/// A group of square RGB images stored NCHW in one flat buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    data: Vec<f32>,
    batch_size: usize,
    size: usize,
}

impl ImageBatch {
    pub fn new(data: Vec<f32>, batch_size: usize, size: usize) -> Result<Self> {
        let expected = batch_size * CHANNELS * size * size;
        if data.len() != expected {
            bail!(
                "Batch of {} images at {}x{} needs {} values, got {}",
                batch_size,
                size,
                size,
                expected,
                data.len()
            );
        }
        Ok(Self {
            data,
            batch_size,
            size,
        })
    }

    /// Stack CHW samples into one batch.
    pub fn from_samples(samples: Vec<Vec<f32>>, size: usize) -> Result<Self> {
        let batch_size = samples.len();
        let data: Vec<f32> = samples.into_iter().flatten().collect();
        Self::new(data, batch_size, size)
    }

    /// Join batches of equal resolution, in order.
    pub fn concat(batches: &[ImageBatch]) -> Result<Self> {
        let Some(first) = batches.first() else {
            bail!("Cannot concatenate an empty list of batches");
        };
        let size = first.size;
        let mut data = Vec::with_capacity(batches.iter().map(|b| b.data.len()).sum());
        let mut batch_size = 0;
        for batch in batches {
            if batch.size != size {
                bail!("Cannot concatenate {}px and {}px batches", size, batch.size);
            }
            data.extend_from_slice(&batch.data);
            batch_size += batch.batch_size;
        }
        Self::new(data, batch_size, size)
    }

    pub fn len(&self) -> usize {
        self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.batch_size == 0
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Channel-first pixels of image `index`.
    pub fn image(&self, index: usize) -> &[f32] {
        let stride = CHANNELS * self.size * self.size;
        &self.data[index * stride..(index + 1) * stride]
    }

    pub fn clipped(&self, min: f32, max: f32) -> Self {
        Self {
            data: self.data.iter().map(|v| v.clamp(min, max)).collect(),
            batch_size: self.batch_size,
            size: self.size,
        }
    }

    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 4> {
        let shape = [self.batch_size, CHANNELS, self.size, self.size];
        Tensor::from_data(TensorData::new(self.data.clone(), shape), device)
    }

    pub fn from_tensor<B: Backend>(tensor: Tensor<B, 4>) -> Result<Self> {
        let [batch_size, channels, height, width] = tensor.dims();
        if channels != CHANNELS || height != width {
            bail!(
                "Expected [N, {}, S, S] images, got [{}, {}, {}, {}]",
                CHANNELS,
                batch_size,
                channels,
                height,
                width
            );
        }
        let data = tensor
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Failed to read tensor data: {:?}", e))?;
        Self::new(data, batch_size, height)
    }
}
