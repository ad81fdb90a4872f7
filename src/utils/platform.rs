use crossterm::tty::IsTty;
use std::env;

use crate::shared::constants;

/// Turn OpenCV's own logging down to errors unless the user asked to see it
/// or already chose a level through the environment. Must run before the
/// first OpenCV call.
pub fn quiet_native_log(show_native_log: bool) {
    if show_native_log || env::var_os(constants::NATIVE_LOG_ENV).is_some() {
        return;
    }
    env::set_var(constants::NATIVE_LOG_ENV, constants::NATIVE_LOG_QUIET_LEVEL);
}

pub fn stdout_is_terminal() -> bool {
    std::io::stdout().is_tty()
}
