use anyhow::Result;

use toonkit::cli::{self, usage, Task};
use toonkit::shared::constants;
use toonkit::utils::logger::{LogLevel, Logger};
use toonkit::utils::platform::quiet_native_log;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((task_name, tokens)) = args.split_first() else {
        println!("{}", usage::SHORT_USAGE);
        return Ok(());
    };

    // OpenCV reads its log level once, on first use
    quiet_native_log(false);
    let logger = Logger::console(constants::HANDLER_LOGGER_NAME, LogLevel::Info);

    // Validation happens before any video is touched
    let task = Task::from_args(task_name, tokens)?;
    cli::run(&task, &logger).map_err(|e| {
        logger.error(&format!("Task {} failed: {:#}", task_name, e));
        e
    })
}
