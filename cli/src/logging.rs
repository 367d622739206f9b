//! Logging setup for the `multicall` binary.
//!
//! Logs go to stderr so that JSON results on stdout stay pipeable.
//!
//! Environment variables:
//! - RUST_LOG: filter directive (e.g. "warn,multicall_call=debug")
//! - LOG_FORMAT: pretty, json or compact
//! - LOG_ANSI: enable ANSI colors (true/false)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

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

    /// Level selected by repeated `-v` flags
    pub fn from_verbosity(verbose: u8) -> Self {
        match verbose {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub ansi_colors: bool,
    /// Raw filter directive; wins over `level` when set
    pub filter: Option<String>,
    /// Noisy dependencies capped below the default level
    pub module_levels: Vec<(String, LogLevel)>,
    pub include_target: bool,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Error,
            format: LogFormat::Compact,
            ansi_colors: true,
            filter: None,
            module_levels: vec![
                ("hyper".to_string(), LogLevel::Warn),
                ("reqwest".to_string(), LogLevel::Warn),
            ],
            include_target: false,
            include_location: false,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            if !rust_log.trim().is_empty() {
                config.filter = Some(rust_log);
            }
        }

        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.format = LogFormat::parse(&format);
        }

        if let Ok(ansi) = std::env::var("LOG_ANSI") {
            config.ansi_colors = ansi.to_lowercase() == "true";
        }

        config
    }

    /// Explicit `-v` flags override RUST_LOG
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        if verbose > 0 {
            self.level = LogLevel::from_verbosity(verbose);
            self.filter = None;
            self.include_target = verbose >= 3;
            self.include_location = verbose >= 4;
        }
        self
    }

    fn build_filter(&self) -> String {
        if let Some(filter) = &self.filter {
            return filter.clone();
        }

        let mut filter = self.level.as_str().to_string();
        for (module, level) in &self.module_levels {
            filter.push_str(&format!(",{}={}", module, level.as_str()));
        }
        filter
    }
}

pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(config.build_filter())
        .map_err(|e| anyhow::anyhow!("Invalid log filter: {}", e))?;

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.include_target)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json().with_ansi(false))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty().with_ansi(config.ansi_colors))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact().with_ansi(config.ansi_colors))
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))
}
