pub mod args;
pub mod task;
pub mod usage;

use anyhow::Result;

pub use args::{ArgsError, FlagMap};
pub use task::Task;

use crate::core;
use crate::utils::logger::Logger;

/// Run a validated task against the video adapter.
pub fn run(task: &Task, logger: &Logger) -> Result<()> {
    match task {
        Task::Cut(request) => {
            core::cut(request, logger)?;
        }
        Task::GenerateImages(request) => {
            core::generate_images(request, logger)?;
        }
        Task::GenerateVideos(request) => {
            core::generate_videos(request, logger)?;
        }
        Task::Examples => println!("{}", usage::EXAMPLES),
        Task::Unsupported(name) => println!("Unsupported task: {}", name),
    }
    Ok(())
}
