use std::time::{Duration, Instant};

pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time rendered as `H:MM:SS.ffffff`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed())
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!(
        "{}:{:02}:{:02}.{:06}",
        hours,
        minutes,
        seconds,
        elapsed.subsec_micros()
    )
}
