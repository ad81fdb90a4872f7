pub mod codec;
pub mod sink;
pub mod video;

pub use codec::Fourcc;
pub use sink::VideoSink;
pub use video::VideoSource;
