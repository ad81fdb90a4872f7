use anyhow::{Context, Result};
use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;
use std::time::Duration;

use super::checkpoint::{load_checkpoint, save_checkpoint};
use super::config::{save_run_config, PretrainConfig, TrainerConfig};
use super::reporter::select_reporter;
use crate::dataset::{DatasetPipeline, ImageBatch, ImageDataset, PipelineConfig};
use crate::model::{ContentLoss, Generator};
use crate::renderer::GridRenderer;
use crate::shared::constants;
use crate::utils::logger::{LogLevel, Logger};
use crate::utils::time_utils::{format_elapsed, Timer};

/// One reporting step as it was logged.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEvent {
    pub step: usize,
    pub loss: f32,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct PretrainSummary {
    pub steps: usize,
    pub last_loss: Option<f32>,
    pub reports: Vec<ReportEvent>,
}

pub fn is_reporting_step(step: usize, reporting_steps: usize) -> bool {
    step > 0 && reporting_steps > 0 && step % reporting_steps == 0
}

/// Runs generator pretraining against a content loss.
pub struct Trainer<B: AutodiffBackend> {
    config: TrainerConfig,
    logger: Logger,
    device: B::Device,
    renderer: GridRenderer,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(config: TrainerConfig, logger: Option<Logger>, device: B::Device) -> Self {
        let logger = logger.unwrap_or_else(|| {
            let fallback = Logger::console("root", LogLevel::Info);
            fallback.warning("No logger was passed to the trainer, logging to the console.");
            fallback.warning("Pass a configured logger to control level and output file.");
            fallback
        });
        let renderer = GridRenderer::new(&config.result_dir);
        Self {
            config,
            logger,
            device,
            renderer,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn pretrain(&self, pretrain: &PretrainConfig) -> Result<PretrainSummary> {
        self.config.validate()?;
        pretrain.validate()?;
        B::seed(pretrain.seed);

        let timer = Timer::new();
        let mut pipeline = self.build_pipeline(pretrain.seed)?;

        self.logger.info("Initializing generator...");
        let mut generator = self.init_generator(pretrain);
        let loss_fn = self.build_loss(pretrain)?;
        self.logger
            .info(&format!("Content loss is computed in {}.", loss_fn.describe()));
        let mut optim = pretrain.optimizer.init::<B, Generator<B>>();

        let checkpoint = self.config.checkpoint_path();
        match load_checkpoint::<B, Generator<B>>(&checkpoint, &self.device) {
            Ok(record) => {
                generator = generator.load_record(record);
                self.logger
                    .info(&format!("Restored generator from {:?}.", checkpoint));
            }
            Err(e) => {
                self.logger
                    .debug(&format!("Starting from scratch: {:#}", e));
            }
        }

        let snapshot = save_run_config(&self.config, pretrain)?;
        self.logger
            .debug(&format!("Run configuration written to {:?}.", snapshot));

        let tracking = self.capture_tracking_set(&mut pipeline, pretrain)?;

        self.logger.info("Starting training loop...");
        let mut reporter = select_reporter(self.config.show_progress, pretrain.num_iterations as u64);
        let mut summary = PretrainSummary::default();

        for step in 0..pretrain.num_iterations {
            let batch = pipeline
                .next_batch()
                .with_context(|| format!("Failed to fetch batch for step {}", step))?;
            let real = batch.to_tensor::<B>(&self.device);
            let generated = generator.forward(real.clone());
            let loss = loss_fn.forward(real, generated);
            let loss_value = loss.clone().into_scalar().elem::<f32>();

            let grads = GradientsParams::from_grads(loss.backward(), &generator);
            generator = optim.step(pretrain.learning_rate, generator, grads);

            summary.steps = step + 1;
            summary.last_loss = Some(loss_value);
            reporter.advance(loss_value);

            if is_reporting_step(step, pretrain.reporting_steps) {
                self.report(&generator, tracking.as_deref(), step)?;
                let elapsed = timer.elapsed();
                self.logger.info(&format!(
                    "Finish step {} with batch_loss: {}, time used: {}",
                    step,
                    loss_value,
                    format_elapsed(elapsed)
                ));
                summary.reports.push(ReportEvent {
                    step,
                    loss: loss_value,
                    elapsed,
                });
            }
        }
        reporter.finish();

        self.logger.info(&format!(
            "Pretraining finished after {} steps in {}.",
            summary.steps,
            timer.elapsed_display()
        ));
        Ok(summary)
    }

    fn build_pipeline(&self, seed: u64) -> Result<DatasetPipeline> {
        self.logger.info(&format!(
            "Building dataset using {} with domain {}...",
            self.config.dataset_name, self.config.source_domain
        ));
        let dataset = ImageDataset::open(&self.config.source_dir())?;
        self.logger
            .info(&format!("{} images are available.", dataset.len()));
        let pipeline_config =
            PipelineConfig::new(self.config.input_size, self.config.batch_size, seed);
        DatasetPipeline::new(&dataset, pipeline_config)
    }

    fn init_generator(&self, pretrain: &PretrainConfig) -> Generator<B> {
        pretrain.generator.init::<B>(&self.device)
    }

    fn build_loss(&self, pretrain: &PretrainConfig) -> Result<ContentLoss<B>> {
        if !pretrain.pass_vgg {
            return Ok(ContentLoss::pixel());
        }
        self.logger.info("Initializing feature extractor...");
        let mut extractor = pretrain.feature_extractor.init::<B>(&self.device);
        match &pretrain.vgg_weights {
            Some(path) => {
                extractor = extractor.load_weights(path, &self.device)?;
                self.logger
                    .info(&format!("Loaded feature extractor weights from {:?}.", path));
            }
            None => self
                .logger
                .warning("No feature extractor weights given, using seeded initialization."),
        }
        Ok(ContentLoss::feature(extractor))
    }

    /// Draw the fixed batches used for progress images and render them once.
    /// `None` when the tracking size is smaller than one batch.
    fn capture_tracking_set(
        &self,
        pipeline: &mut DatasetPipeline,
        pretrain: &PretrainConfig,
    ) -> Result<Option<Vec<ImageBatch>>> {
        let count = pretrain.tracking_batches(self.config.batch_size);
        if count == 0 {
            self.logger.warning(&format!(
                "Tracking size {} is smaller than batch size {}, no images will be rendered.",
                pretrain.tracking_size, self.config.batch_size
            ));
            return Ok(None);
        }

        let batches = (0..count)
            .map(|_| pipeline.next_batch())
            .collect::<Result<Vec<_>>>()?;
        let baseline = ImageBatch::concat(&batches)?.clipped(0.0, 1.0);
        let path = self
            .renderer
            .render(&baseline, constants::ORIGINAL_IMAGE_FILE)?;
        self.logger
            .debug(&format!("Tracking images written to {:?}.", path));
        Ok(Some(batches))
    }

    fn report(
        &self,
        generator: &Generator<B>,
        tracking: Option<&[ImageBatch]>,
        step: usize,
    ) -> Result<()> {
        let generated = match tracking {
            Some(tracking) => {
                let inference = generator.valid();
                tracking
                    .iter()
                    .map(|batch| {
                        let input = batch.to_tensor::<B::InnerBackend>(&self.device);
                        ImageBatch::from_tensor(inference.forward(input))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            None => Vec::new(),
        };

        save_checkpoint::<B, _>(generator, &self.config.checkpoint_path())?;

        if generated.is_empty() {
            return Ok(());
        }
        let sheet = ImageBatch::concat(&generated)?.clipped(0.0, 1.0);
        self.renderer
            .render(&sheet, &constants::generated_image_file(step))?;
        Ok(())
    }
}
