//! Structured logging setup.
//!
//! Pretty output for terminals and JSON for log aggregation, selected through
//! environment variables:
//! - `RUST_LOG`: filter directives (e.g. "info,agrisense_inference=debug")
//! - `LOG_FORMAT`: json, pretty or compact
//! - `LOG_ANSI`: enable ANSI colors (true/false)

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Unrecognised names fall back to `Info`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format for log aggregation
    Json,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: LogLevel,
    pub format: LogFormat,
    /// Enable ANSI colors (ignored for JSON)
    pub ansi_colors: bool,
    /// Emit span close events with timings
    pub span_events: bool,
    /// Module-specific log levels
    pub module_levels: Vec<(String, LogLevel)>,
    pub include_target: bool,
    /// Include file and line in logs
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            ansi_colors: true,
            span_events: false,
            module_levels: vec![
                ("hyper".to_string(), LogLevel::Warn),
                ("reqwest".to_string(), LogLevel::Warn),
            ],
            include_target: true,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("RUST_LOG").ok().as_deref(),
            std::env::var("LOG_FORMAT").ok().as_deref(),
            std::env::var("LOG_ANSI").ok().as_deref(),
        )
    }

    fn from_vars(rust_log: Option<&str>, format: Option<&str>, ansi: Option<&str>) -> Self {
        let mut config = match format.map(LogFormat::parse) {
            Some(LogFormat::Json) => Self::production(),
            Some(format) => Self {
                format,
                ..Self::default()
            },
            None => Self::default(),
        };

        if let Some(rust_log) = rust_log {
            // Leading bare directive is the default level
            let level = rust_log.split(',').next().unwrap_or("info");
            config.level = LogLevel::parse(level);
        }
        if let Some(ansi) = ansi {
            config.ansi_colors = ansi.eq_ignore_ascii_case("true");
        }

        config
    }

    /// JSON logging for production
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            ansi_colors: false,
            span_events: true,
            module_levels: vec![
                ("agrisense_api".to_string(), LogLevel::Info),
                ("tower_http".to_string(), LogLevel::Info),
                ("hyper".to_string(), LogLevel::Warn),
                ("reqwest".to_string(), LogLevel::Warn),
            ],
            include_target: true,
            include_location: true,
        }
    }

    /// Build the env filter string
    fn build_filter(&self) -> String {
        let mut filter = self.level.as_str().to_string();

        for (module, level) in &self.module_levels {
            filter.push_str(&format!(",{}={}", module, level.as_str()));
        }

        filter
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    // RUST_LOG wins over the configured levels
    let filter = match std::env::var("RUST_LOG") {
        Ok(rust_log) => EnvFilter::new(rust_log),
        Err(_) => EnvFilter::new(config.build_filter()),
    };

    let span_events = if config.span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_target(config.include_target)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(span_events);

    let layer = match config.format {
        LogFormat::Json => layer.json().with_ansi(false).boxed(),
        LogFormat::Pretty => layer.pretty().with_ansi(config.ansi_colors).boxed(),
        LogFormat::Compact => layer.compact().with_ansi(config.ansi_colors).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    Ok(())
}
