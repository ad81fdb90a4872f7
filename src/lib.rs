pub mod cli;
pub mod core;
pub mod dataset;
pub mod decoder;
pub mod model;
pub mod renderer;
pub mod shared;
pub mod train;
pub mod utils;
