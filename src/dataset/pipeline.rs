use anyhow::{anyhow, bail, Result};
use crossbeam_channel::{Receiver, Sender};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use super::batch::ImageBatch;
use super::decode::decode_image;
use crate::shared::constants;
use crate::utils::file_utils::list_files;

/// The image files of one dataset domain.
#[derive(Debug, Clone)]
pub struct ImageDataset {
    files: Vec<PathBuf>,
}

impl ImageDataset {
    /// `<root>/<dataset_name>/train<domain>`
    pub fn domain_dir(root: &Path, dataset_name: &str, domain: &str) -> PathBuf {
        root.join(dataset_name).join(format!("train{}", domain))
    }

    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Self {
            files: list_files(dir)?,
        })
    }

    pub fn from_files(files: Vec<PathBuf>) -> Result<Self> {
        if files.is_empty() {
            bail!("A dataset needs at least one image");
        }
        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_size: usize,
    pub batch_size: usize,
    pub shuffle_buffer: usize,
    pub prefetch: usize,
    pub seed: u64,
}

impl PipelineConfig {
    pub fn new(input_size: usize, batch_size: usize, seed: u64) -> Self {
        Self {
            input_size,
            batch_size,
            shuffle_buffer: constants::SHUFFLE_BUFFER_SIZE,
            prefetch: constants::PREFETCH_BATCHES,
            seed,
        }
    }
}

/// Endless stream of file paths, shuffled per epoch through a bounded
/// buffer: each draw takes a random buffered entry and refills from the
/// epoch's remaining files. Every file appears once per epoch.
pub struct ShuffledPaths {
    files: Arc<[PathBuf]>,
    buffer: Vec<usize>,
    capacity: usize,
    cursor: usize,
    rng: StdRng,
}

impl ShuffledPaths {
    pub fn new(files: Arc<[PathBuf]>, capacity: usize, seed: u64) -> Self {
        Self {
            files,
            buffer: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            cursor: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Iterator for ShuffledPaths {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let n = self.files.len();
        if n == 0 {
            return None;
        }
        if self.cursor >= n && self.buffer.is_empty() {
            // next epoch
            self.cursor = 0;
        }
        while self.buffer.len() < self.capacity && self.cursor < n {
            self.buffer.push(self.cursor);
            self.cursor += 1;
        }
        let pick = self.rng.gen_range(0..self.buffer.len());
        let index = self.buffer.swap_remove(pick);
        Some(self.files[index].clone())
    }
}

/// Infinite batched image stream with background prefetching.
///
/// A producer thread pulls shuffled paths, decodes each batch in parallel
/// and hands it over a bounded channel. `next_batch` blocks until a batch is
/// ready. A decode error is delivered once and ends the stream.
pub struct DatasetPipeline {
    receiver: Option<Receiver<Result<ImageBatch>>>,
    handle: Option<JoinHandle<()>>,
}

impl DatasetPipeline {
    pub fn new(dataset: &ImageDataset, config: PipelineConfig) -> Result<Self> {
        if config.batch_size == 0 {
            bail!("Batch size must be at least 1");
        }
        if config.input_size == 0 {
            bail!("Input size must be at least 1");
        }

        let paths = ShuffledPaths::new(
            Arc::from(dataset.files().to_vec()),
            config.shuffle_buffer,
            config.seed,
        );
        let (sender, receiver) = crossbeam_channel::bounded(config.prefetch.max(1));
        let batch_size = config.batch_size;
        let input_size = config.input_size;
        let handle = std::thread::Builder::new()
            .name("dataset-prefetch".to_string())
            .spawn(move || produce(paths, batch_size, input_size, sender))?;

        Ok(Self {
            receiver: Some(receiver),
            handle: Some(handle),
        })
    }

    pub fn next_batch(&mut self) -> Result<ImageBatch> {
        let receiver = self
            .receiver
            .as_ref()
            .ok_or_else(|| anyhow!("Dataset pipeline is closed"))?;
        match receiver.recv() {
            Ok(batch) => batch,
            Err(_) => bail!("Dataset pipeline stopped producing batches"),
        }
    }
}

impl Drop for DatasetPipeline {
    fn drop(&mut self) {
        // Disconnect first so a producer blocked on `send` wakes up and exits.
        self.receiver.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn produce(
    mut paths: ShuffledPaths,
    batch_size: usize,
    input_size: usize,
    sender: Sender<Result<ImageBatch>>,
) {
    loop {
        let batch_paths: Vec<PathBuf> = paths.by_ref().take(batch_size).collect();
        let batch = batch_paths
            .par_iter()
            .map(|path| decode_image(path, input_size))
            .collect::<Result<Vec<_>>>()
            .and_then(|samples| ImageBatch::from_samples(samples, input_size));

        let failed = batch.is_err();
        if sender.send(batch).is_err() || failed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    fn paths(n: usize) -> Arc<[PathBuf]> {
        (0..n)
            .map(|i| PathBuf::from(format!("img{}.png", i)))
            .collect::<Vec<_>>()
            .into()
    }

    fn write_dataset(dir: &Path, count: usize) {
        let _ = fs::remove_dir_all(dir);
        fs::create_dir_all(dir).unwrap();
        for i in 0..count {
            let shade = (i * 40) as u8;
            image::RgbImage::from_pixel(12, 12, image::Rgb([shade, shade, shade]))
                .save(dir.join(format!("{:03}.png", i)))
                .unwrap();
        }
    }

    #[test]
    fn test_every_file_once_per_epoch() {
        let mut stream = ShuffledPaths::new(paths(10), 4, 7);
        for _ in 0..3 {
            let epoch: HashSet<PathBuf> = stream.by_ref().take(10).collect();
            assert_eq!(epoch.len(), 10);
        }
    }

    #[test]
    fn test_buffer_of_one_keeps_order() {
        let stream = ShuffledPaths::new(paths(3), 1, 0);
        let order: Vec<PathBuf> = stream.take(6).collect();
        let expected: Vec<PathBuf> = paths(3).iter().chain(paths(3).iter()).cloned().collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_same_seed_same_order() {
        let a: Vec<PathBuf> = ShuffledPaths::new(paths(50), 16, 42).take(120).collect();
        let b: Vec<PathBuf> = ShuffledPaths::new(paths(50), 16, 42).take(120).collect();
        let c: Vec<PathBuf> = ShuffledPaths::new(paths(50), 16, 43).take(120).collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_domain_dir() {
        assert_eq!(
            ImageDataset::domain_dir(Path::new("datasets"), "realworld2cartoon", "A"),
            PathBuf::from("datasets/realworld2cartoon/trainA")
        );
    }

    #[test]
    fn test_pipeline_repeats_and_batches() {
        let dir = std::env::temp_dir().join("toonkit_pipeline_test/trainA");
        write_dataset(&dir, 3);

        let dataset = ImageDataset::open(&dir).unwrap();
        assert_eq!(dataset.len(), 3);
        let mut pipeline = DatasetPipeline::new(&dataset, PipelineConfig::new(8, 2, 1)).unwrap();

        // 3 images, batches of 2: the stream has to wrap into a second epoch
        for _ in 0..4 {
            let batch = pipeline.next_batch().unwrap();
            assert_eq!(batch.len(), 2);
            assert_eq!(batch.size(), 8);
            assert!(batch.data().iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_pipeline_surfaces_decode_errors() {
        let dir = std::env::temp_dir().join("toonkit_pipeline_bad/trainA");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("broken.jpg"), b"garbage").unwrap();

        let dataset = ImageDataset::open(&dir).unwrap();
        let mut pipeline = DatasetPipeline::new(&dataset, PipelineConfig::new(8, 1, 0)).unwrap();
        assert!(pipeline.next_batch().is_err());
        // the producer has exited; the stream stays closed
        assert!(pipeline.next_batch().is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let dataset = ImageDataset::from_files(vec![PathBuf::from("a.png")]).unwrap();
        assert!(DatasetPipeline::new(&dataset, PipelineConfig::new(8, 0, 0)).is_err());
    }
}
