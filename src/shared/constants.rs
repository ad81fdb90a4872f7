pub const TRAINER_LOGGER_NAME: &str = "Trainer";
pub const HANDLER_LOGGER_NAME: &str = "Handler";

pub const NATIVE_LOG_ENV: &str = "OPENCV_LOG_LEVEL";
pub const NATIVE_LOG_QUIET_LEVEL: &str = "ERROR";

// Frame sequences
pub const FRAME_FILE_PREFIX: &str = "frame";
pub const FRAME_INDEX_DIGITS: usize = 5;
pub const FRAME_FILE_EXTENSION: &str = "png";
pub const DEFAULT_ASSEMBLY_FPS: f64 = 24.0;
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

// Dataset
pub const DATASETS_ROOT: &str = "datasets";
pub const SHUFFLE_BUFFER_SIZE: usize = 10_000;
pub const PREFETCH_BATCHES: usize = 2;

// Training artifacts
pub const CHECKPOINT_NAME: &str = "pretrain_generator";
pub const RESULT_DIR: &str = "generated_images";
pub const ORIGINAL_IMAGE_FILE: &str = "original_image.png";
pub const RUN_CONFIG_FILE: &str = "pretrain_config.json";

// Image grid
pub const GRID_COLUMNS: usize = 8;
pub const GRID_GUTTER: u32 = 2;

pub fn generated_image_file(step: usize) -> String {
    format!("generated_image_at_step_{}.png", step)
}

pub fn frame_file_name(index: usize) -> String {
    format!(
        "{}{:0width$}.{}",
        FRAME_FILE_PREFIX,
        index,
        FRAME_FILE_EXTENSION,
        width = FRAME_INDEX_DIGITS
    )
}
