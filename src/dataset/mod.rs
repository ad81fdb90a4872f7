pub mod batch;
pub mod decode;
pub mod pipeline;

pub use batch::ImageBatch;
pub use pipeline::{DatasetPipeline, ImageDataset, PipelineConfig};
