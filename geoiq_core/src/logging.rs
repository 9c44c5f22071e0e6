//! Named loggers handed out by an injected registry

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

/// Serialized lowercase. Parsing, from strings or config, is case-insensitive
/// and accepts `trace` and `warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// DEBUG for development builds, INFO for release builds.
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::for_build()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        value.parse()
    }
}

/// Hands out one shared [`Logger`] per service name.
///
/// Loggers are created lazily and live as long as the registry. Cloning the
/// registry shares the same set of loggers and the same threshold.
#[derive(Clone, Default)]
pub struct LoggerRegistry {
    threshold: Arc<RwLock<LogLevel>>,
    loggers: Arc<Mutex<HashMap<String, Logger>>>,
}

impl LoggerRegistry {
    pub fn new(threshold: LogLevel) -> Self {
        Self {
            threshold: Arc::new(RwLock::new(threshold)),
            loggers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn logger(&self, service: &str) -> Logger {
        self.loggers
            .lock()
            .entry(service.to_string())
            .or_insert_with(|| Logger {
                service: Arc::from(service),
                threshold: Arc::clone(&self.threshold),
            })
            .clone()
    }

    pub fn set_threshold(&self, level: LogLevel) {
        *self.threshold.write() = level;
    }

    pub fn threshold(&self) -> LogLevel {
        *self.threshold.read()
    }

    pub fn len(&self) -> usize {
        self.loggers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.lock().is_empty()
    }
}

/// Leveled logger tagged with a service name. Never fails.
#[derive(Clone)]
pub struct Logger {
    service: Arc<str>,
    threshold: Arc<RwLock<LogLevel>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("service", &self.service)
            .finish()
    }
}

impl Logger {
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= *self.threshold.read()
    }

    pub fn same_as(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.service, &other.service)
    }

    pub fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message, None);
    }

    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message, None);
    }

    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message, None);
    }

    pub fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message, None);
    }

    pub fn debug_with<T: Serialize + ?Sized>(&self, message: &str, data: &T) {
        if self.enabled(LogLevel::Debug) {
            self.emit(LogLevel::Debug, message, Some(safe_stringify(data)));
        }
    }

    pub fn info_with<T: Serialize + ?Sized>(&self, message: &str, data: &T) {
        if self.enabled(LogLevel::Info) {
            self.emit(LogLevel::Info, message, Some(safe_stringify(data)));
        }
    }

    pub fn warn_with<T: Serialize + ?Sized>(&self, message: &str, data: &T) {
        if self.enabled(LogLevel::Warn) {
            self.emit(LogLevel::Warn, message, Some(safe_stringify(data)));
        }
    }

    pub fn error_with<T: Serialize + ?Sized>(&self, message: &str, data: &T) {
        if self.enabled(LogLevel::Error) {
            self.emit(LogLevel::Error, message, Some(safe_stringify(data)));
        }
    }

    fn emit(&self, level: LogLevel, message: &str, data: Option<String>) {
        if !self.enabled(level) {
            return;
        }
        let service = &*self.service;
        let data = data.as_deref();
        match level {
            LogLevel::Debug => tracing::debug!(service, data, "{}", message),
            LogLevel::Info => tracing::info!(service, data, "{}", message),
            LogLevel::Warn => tracing::warn!(service, data, "{}", message),
            LogLevel::Error => tracing::error!(service, data, "{}", message),
        }
    }
}

/// Serializes `data` for a log line, falling back to a placeholder.
pub fn safe_stringify<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_else(|e| format!("[unserializable: {}]", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cycle detected"))
        }
    }

    #[test]
    fn test_one_logger_per_service() {
        let registry = LoggerRegistry::new(LogLevel::Info);
        let a = registry.logger("cache");
        let b = registry.logger("cache");
        let c = registry.logger("api");

        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_threshold_is_shared() {
        let registry = LoggerRegistry::new(LogLevel::Info);
        let logger = registry.logger("dashboard");
        assert!(!logger.enabled(LogLevel::Debug));
        assert!(logger.enabled(LogLevel::Warn));

        registry.set_threshold(LogLevel::Debug);
        assert!(logger.enabled(LogLevel::Debug));
    }

    #[test]
    fn test_unserializable_data_is_swallowed() {
        let rendered = safe_stringify(&Unserializable);
        assert!(rendered.starts_with("[unserializable"));

        let logger = LoggerRegistry::new(LogLevel::Debug).logger("test");
        logger.error_with("still logs", &Unserializable);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_deserializes_like_it_parses() {
        for (raw, expected) in [
            ("\"WARN\"", LogLevel::Warn),
            ("\"warning\"", LogLevel::Warn),
            ("\"trace\"", LogLevel::Debug),
            ("\"Error\"", LogLevel::Error),
        ] {
            assert_eq!(serde_json::from_str::<LogLevel>(raw).unwrap(), expected);
        }
        assert!(serde_json::from_str::<LogLevel>("\"loud\"").is_err());
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"warn\"");
    }
}
