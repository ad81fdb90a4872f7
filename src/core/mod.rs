pub mod assembler;
pub mod cutter;
pub mod extractor;
pub mod soundtrack;
pub mod timing;

pub use assembler::{generate_videos, AssembleRequest};
pub use cutter::{cut, CutRequest};
pub use extractor::{generate_images, ExtractRequest};
pub use soundtrack::Soundtrack;
pub use timing::{CropRect, Interval};
