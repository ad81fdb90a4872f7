use anyhow::Result;
use burn::backend::Autodiff;
use clap::Parser;
use std::path::PathBuf;

use toonkit::shared::constants;
use toonkit::train::{PretrainConfig, Trainer, TrainerConfig};
use toonkit::utils::logger::{LogLevel, Logger};
use toonkit::utils::platform::quiet_native_log;

#[cfg(not(feature = "wgpu"))]
type Backend = burn::backend::NdArray<f32>;
#[cfg(feature = "wgpu")]
type Backend = burn::backend::Wgpu;

type TrainBackend = Autodiff<Backend>;

/// Pretrain the generator to reconstruct its own input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct PretrainArgs {
    #[arg(long = "dataset_name", default_value = "realworld2cartoon")]
    dataset_name: String,
    #[arg(long = "datasets_root", default_value = constants::DATASETS_ROOT)]
    datasets_root: PathBuf,
    #[arg(long = "input_size", default_value_t = 256)]
    input_size: usize,
    #[arg(long = "batch_size", default_value_t = 1)]
    batch_size: usize,
    #[arg(long = "source_domain", default_value = "A")]
    source_domain: String,
    #[arg(long = "target_domain", default_value = "B")]
    target_domain: String,

    /// Compare images in feature space instead of pixel space
    #[arg(long = "pretrain_pass_vgg")]
    pass_vgg: bool,
    #[arg(long = "pretrain_learning_rate", default_value_t = 1e-5)]
    learning_rate: f64,
    #[arg(long = "pretrain_num_iterations", default_value_t = 3000)]
    num_iterations: usize,
    #[arg(long = "pretrain_tracking_size", default_value_t = 16)]
    tracking_size: usize,
    #[arg(long = "pretrain_reporting_steps", default_value_t = 100)]
    reporting_steps: usize,
    #[arg(long = "pretrain_seed", default_value_t = 0)]
    seed: u64,
    /// Feature extractor record file (burn MessagePack)
    #[arg(long = "vgg_weights")]
    vgg_weights: Option<PathBuf>,

    #[arg(long = "logdir", default_value = "runs")]
    logdir: PathBuf,
    #[arg(long = "save_dir", default_value = "ckpts")]
    save_dir: PathBuf,
    #[arg(long = "logging_lvl", value_enum, default_value_t = LogLevel::Info)]
    logging_lvl: LogLevel,
    /// Also append log lines to this file
    #[arg(long = "logger_out_file")]
    logger_out_file: Option<PathBuf>,
    #[arg(long = "not_show_progress_bar")]
    not_show_progress_bar: bool,
    /// Force debug level logging
    #[arg(long = "debug")]
    debug: bool,
    /// Keep OpenCV's own log output
    #[arg(long = "show_native_log")]
    show_native_log: bool,
}

impl PretrainArgs {
    fn logger(&self) -> Result<Logger> {
        let level = if self.debug {
            LogLevel::Debug
        } else {
            self.logging_lvl
        };
        let logger = Logger::console(constants::TRAINER_LOGGER_NAME, level);
        match &self.logger_out_file {
            Some(path) => logger.with_file(path),
            None => Ok(logger),
        }
    }

    fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig::new(
            self.dataset_name.clone(),
            self.datasets_root.clone(),
            self.source_domain.clone(),
            self.target_domain.clone(),
            self.logdir.clone(),
            self.save_dir.clone(),
            PathBuf::from(constants::RESULT_DIR),
        )
        .with_input_size(self.input_size)
        .with_batch_size(self.batch_size)
        .with_show_progress(!self.not_show_progress_bar)
    }

    fn pretrain_config(&self) -> PretrainConfig {
        PretrainConfig::with_defaults()
            .with_pass_vgg(self.pass_vgg)
            .with_learning_rate(self.learning_rate)
            .with_num_iterations(self.num_iterations)
            .with_tracking_size(self.tracking_size)
            .with_reporting_steps(self.reporting_steps)
            .with_seed(self.seed)
            .with_vgg_weights(self.vgg_weights.clone())
    }
}

fn main() -> Result<()> {
    let args = PretrainArgs::parse();
    quiet_native_log(args.show_native_log);

    let logger = args.logger()?;
    logger.debug(&format!("{:?}", args));

    let device = Default::default();
    let trainer = Trainer::<TrainBackend>::new(args.trainer_config(), Some(logger), device);
    let summary = match trainer.pretrain(&args.pretrain_config()) {
        Ok(summary) => summary,
        Err(e) => {
            trainer
                .logger()
                .critical(&format!("Pretraining failed: {:#}", e));
            return Err(e);
        }
    };
    if let Some(loss) = summary.last_loss {
        trainer
            .logger()
            .info(&format!("Last batch_loss after {} steps: {}", summary.steps, loss));
    }
    Ok(())
}
