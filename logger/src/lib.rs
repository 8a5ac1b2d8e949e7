use chrono::Utc;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Severity of a log line. Lines below the logger's minimum level are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(LoggerError::InvalidLevel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
}

impl Color {
    fn to_ansi_code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Blue => "\x1b[34m",
            Color::Yellow => "\x1b[33m",
            Color::Cyan => "\x1b[36m",
            Color::Magenta => "\x1b[35m",
            Color::White => "\x1b[37m",
        }
    }
}

/// Writes timestamped lines to an optional log file and, optionally, to the
/// console with ANSI colors.
///
/// Cloning a `Logger` is cheap; clones share the same log file.
#[derive(Debug, Clone)]
pub struct Logger {
    log_file: Option<PathBuf>,
    to_console: bool,
    min_level: Level,
}

impl Logger {
    /// Creates a logger writing to `station_map_{name}.log` inside `log_dir`
    /// and echoing to the console.
    ///
    /// # Parameters
    /// - `log_dir`: Existing directory where the log file should be created.
    /// - `name`: Name of the view or component, included in the file name.
    ///
    /// # Errors
    /// `LoggerError::InvalidPath` if `log_dir` is not a directory, or
    /// `LoggerError::IoError` if the file cannot be created.
    pub fn new(log_dir: &Path, name: &str) -> Result<Self, LoggerError> {
        if !log_dir.is_dir() {
            return Err(LoggerError::InvalidPath(format!(
                "{} is not a directory",
                log_dir.display()
            )));
        }

        let sanitized = name.replace([':', '/', ' '], "_");
        let log_file = log_dir.join(format!("station_map_{}.log", sanitized));

        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&log_file)
            .map_err(LoggerError::from)?;

        Ok(Logger {
            log_file: Some(log_file),
            to_console: true,
            min_level: Level::Info,
        })
    }

    /// A logger with no file sink that only prints to the console.
    pub fn console() -> Self {
        Logger {
            log_file: None,
            to_console: true,
            min_level: Level::Info,
        }
    }

    /// A logger that discards everything. Handy for tests and headless runs.
    pub fn silent() -> Self {
        Logger {
            log_file: None,
            to_console: false,
            min_level: Level::Error,
        }
    }

    pub fn with_console(mut self, to_console: bool) -> Self {
        self.to_console = to_console;
        self
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    fn log(&self, level: Level, color: Option<Color>, message: &str) -> Result<(), LoggerError> {
        if level < self.min_level || (self.log_file.is_none() && !self.to_console) {
            return Ok(());
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let line = format!("[{}] [{}]: {}\n", level.tag(), timestamp, message);

        if self.to_console {
            let colored = match (level, color) {
                (Level::Warn, _) => format!("\x1b[93m{}\x1b[0m", line),
                (Level::Error, _) => format!("\x1b[91m{}\x1b[0m", line),
                (_, Some(color)) => format!("{}{}\x1b[0m", color.to_ansi_code(), line),
                (_, None) => line.clone(),
            };
            let mut stdout = io::stdout().lock();
            stdout.write_all(colored.as_bytes())?;
            stdout.flush()?;
        }

        if let Some(path) = &self.log_file {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(line.as_bytes())?;
            file.flush()?;
        }

        Ok(())
    }

    pub fn debug(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Debug, None, message)
    }

    /// Logs an informational message, colored with `color` on the console.
    pub fn info(&self, message: &str, color: Color) -> Result<(), LoggerError> {
        self.log(Level::Info, Some(color), message)
    }

    pub fn warn(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Warn, None, message)
    }

    pub fn error(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Error, None, message)
    }
}

#[derive(Debug)]
pub enum LoggerError {
    IoError(std::io::Error),
    InvalidPath(String),
    InvalidLevel(String),
}

impl std::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggerError::IoError(e) => write!(f, "I/O Error: {}", e),
            LoggerError::InvalidPath(msg) => write!(f, "Invalid Path: {}", msg),
            LoggerError::InvalidLevel(level) => write!(f, "Invalid log level: {}", level),
        }
    }
}

impl std::error::Error for LoggerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggerError::IoError(e) => Some(e),
            LoggerError::InvalidPath(_) | LoggerError::InvalidLevel(_) => None,
        }
    }
}

impl From<std::io::Error> for LoggerError {
    fn from(err: std::io::Error) -> Self {
        LoggerError::IoError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("station_map_logger_{}", name));
        fs::create_dir_all(&dir).expect("Failed to create test directory");
        dir
    }

    #[test]
    fn test_logger_creation_and_logging() {
        let log_dir = scratch_dir("creation");
        let logger = Logger::new(&log_dir, "detail view")
            .expect("Failed to create logger")
            .with_console(false);

        logger
            .info("surface mounted", Color::Green)
            .expect("Failed to log message");
        logger.warn("geolocation denied").expect("Failed to log");

        let path = log_dir.join("station_map_detail_view.log");
        assert_eq!(logger.log_file(), Some(path.as_path()));
        let contents = fs::read_to_string(&path).expect("Failed to read log file");

        assert!(contents.contains("[INFO]"));
        assert!(contents.contains("surface mounted"));
        assert!(contents.contains("[WARN]"));

        fs::remove_dir_all(log_dir).expect("Failed to remove test directory");
    }

    #[test]
    fn test_lines_below_min_level_are_dropped() {
        let log_dir = scratch_dir("levels");
        let logger = Logger::new(&log_dir, "levels")
            .expect("Failed to create logger")
            .with_console(false)
            .with_min_level(Level::Warn);

        logger.debug("noise").unwrap();
        logger.info("more noise", Color::Cyan).unwrap();
        logger.error("kept").unwrap();

        let contents = fs::read_to_string(log_dir.join("station_map_levels.log")).unwrap();
        assert!(!contents.contains("noise"));
        assert!(contents.contains("[ERROR]"));

        fs::remove_dir_all(log_dir).unwrap();
    }

    #[test]
    fn test_invalid_path() {
        let result = Logger::new(Path::new("/invalid/path"), "view");
        assert!(matches!(result, Err(LoggerError::InvalidPath(_))));
    }

    #[test]
    fn test_silent_logger_never_fails() {
        let logger = Logger::silent();
        assert!(logger.error("dropped").is_ok());
        assert!(logger.log_file().is_none());
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!(" WARNING ".parse::<Level>().unwrap(), Level::Warn);
        assert!("verbose".parse::<Level>().is_err());
        assert!(Level::Debug < Level::Error);
    }
}
