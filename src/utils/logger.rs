use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
#[cfg(test)]
use std::sync::Arc;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

enum Sink {
    Stdout,
    File(Mutex<File>),
    #[cfg(test)]
    Memory(Arc<Mutex<Vec<String>>>),
}

/// Named, levelled logger handle.
///
/// There is no process-wide logger: whoever needs to log receives a `Logger`
/// (or a reference to one) explicitly. Lines look like
/// `[2024-01-01 12:00:00] [Trainer] [INFO] message`.
pub struct Logger {
    name: String,
    level: LogLevel,
    sinks: Vec<Sink>,
}

impl Logger {
    /// Logger writing to stdout.
    pub fn console(name: &str, level: LogLevel) -> Self {
        Self {
            name: name.to_string(),
            level,
            sinks: vec![Sink::Stdout],
        }
    }

    /// Logger that drops every line.
    pub fn noop() -> Self {
        Self {
            name: String::new(),
            level: LogLevel::Critical,
            sinks: Vec::new(),
        }
    }

    /// Additionally append every line to `path`.
    pub fn with_file(mut self, path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;
        self.sinks.push(Sink::File(Mutex::new(file)));
        Ok(self)
    }

    #[cfg(test)]
    pub(crate) fn in_memory(name: &str, level: LogLevel) -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let logger = Self {
            name: name.to_string(),
            level,
            sinks: vec![Sink::Memory(Arc::clone(&lines))],
        };
        (logger, lines)
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        !self.sinks.is_empty() && level >= self.level
    }

    pub fn log(&self, level: LogLevel, msg: &str) {
        if !self.enabled(level) {
            return;
        }
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] [{}] [{}] {}", timestamp, self.name, level.label(), msg);
        for sink in &self.sinks {
            match sink {
                Sink::Stdout => println!("{}", line),
                Sink::File(file) => {
                    let mut file = match file.lock() {
                        Ok(f) => f,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    let _ = writeln!(file, "{}", line);
                }
                #[cfg(test)]
                Sink::Memory(lines) => {
                    if let Ok(mut lines) = lines.lock() {
                        lines.push(line.clone());
                    }
                }
            }
        }
    }

    pub fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }

    pub fn warning(&self, msg: &str) {
        self.log(LogLevel::Warning, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }

    pub fn critical(&self, msg: &str) {
        self.log(LogLevel::Critical, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filtering() {
        let (logger, lines) = Logger::in_memory("Trainer", LogLevel::Warning);
        logger.info("hidden");
        logger.warning("shown");
        logger.error("failed");
        logger.critical("also shown");

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("[Trainer] [WARNING] shown"));
        assert!(lines[1].contains("[ERROR] failed"));
        assert!(lines[2].contains("[CRITICAL] also shown"));
    }

    #[test]
    fn test_line_format() {
        let (logger, lines) = Logger::in_memory("Handler", LogLevel::Debug);
        logger.debug("hello");
        let line = lines.lock().unwrap()[0].clone();
        // [YYYY-MM-DD HH:MM:SS] is 21 characters
        assert!(line.starts_with('['));
        assert_eq!(&line[20..21], "]");
        assert!(line.ends_with("[Handler] [DEBUG] hello"));
    }

    #[test]
    fn test_file_sink_appends() {
        let tmp_dir = std::env::temp_dir().join("toonkit_logger_test");
        std::fs::create_dir_all(&tmp_dir).unwrap();
        let path = tmp_dir.join("out.log");
        let _ = std::fs::remove_file(&path);

        let logger = Logger::noop().with_file(&path).unwrap();
        // noop keeps the critical threshold
        logger.info("dropped");
        logger.critical("kept");

        let again = Logger::noop().with_file(&path).unwrap();
        again.critical("kept again");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("dropped"));
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_noop_is_silent() {
        let logger = Logger::noop();
        assert!(!logger.enabled(LogLevel::Critical));
    }
}
