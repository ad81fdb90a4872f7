#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

#[cfg(feature = "progress")]
use crate::utils::platform::stdout_is_terminal;

/// Per-step progress sink driven by the training loop.
pub trait StepReporter {
    fn advance(&mut self, loss: f32);
    fn finish(&mut self);
}

/// Reports nothing.
#[derive(Debug, Default)]
pub struct Passthrough {
    steps: u64,
}

impl Passthrough {
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl StepReporter for Passthrough {
    fn advance(&mut self, _loss: f32) {
        self.steps += 1;
    }

    fn finish(&mut self) {}
}

#[cfg(feature = "progress")]
pub struct ProgressBarReporter {
    bar: ProgressBar,
}

#[cfg(feature = "progress")]
impl ProgressBarReporter {
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} | ETA: {eta} | {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        Self { bar }
    }
}

#[cfg(feature = "progress")]
impl StepReporter for ProgressBarReporter {
    fn advance(&mut self, loss: f32) {
        self.bar.set_message(format!("loss {:.5}", loss));
        self.bar.inc(1);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}

/// A progress bar when it was asked for, compiled in, and stdout is a
/// terminal. Otherwise a pass-through.
pub fn select_reporter(show_progress: bool, total: u64) -> Box<dyn StepReporter> {
    #[cfg(feature = "progress")]
    {
        if show_progress && stdout_is_terminal() {
            return Box::new(ProgressBarReporter::new(total));
        }
    }
    #[cfg(not(feature = "progress"))]
    let _ = (show_progress, total);

    Box::new(Passthrough::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_counts_steps() {
        let mut reporter = Passthrough::default();
        for _ in 0..5 {
            reporter.advance(0.5);
        }
        reporter.finish();
        assert_eq!(reporter.steps(), 5);
    }

    #[test]
    fn test_disabled_progress_still_reports() {
        let mut reporter = select_reporter(false, 3);
        reporter.advance(1.0);
        reporter.finish();
    }

    #[cfg(feature = "progress")]
    #[test]
    fn test_progress_bar_position() {
        let mut reporter = ProgressBarReporter::new(4);
        reporter.advance(0.25);
        reporter.advance(0.125);
        assert_eq!(reporter.bar.position(), 2);
        reporter.finish();
        assert!(reporter.bar.is_finished());
    }
}
