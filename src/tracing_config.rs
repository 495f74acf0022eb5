//! Tracing configuration for the CLI
//!
//! The library only emits `tracing` events and spans. Binaries install a
//! subscriber through [`TracingConfig`].

#[cfg(feature = "cli")]
use tracing_subscriber::{
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default for CLI)
    Console,
    /// Compact console output without colors, for CI logs
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Configuration for tracing output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracingOutput {
    /// Output to stderr (default)
    Console,
    /// Append to a file
    #[cfg(feature = "tracing-files")]
    File(std::path::PathBuf),
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Output destination
    pub output: TracingOutput,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlation
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            output: TracingOutput::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Set custom environment filter, e.g. `segdemo=trace`
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Set session ID logged when the subscriber starts
    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Install the global subscriber
    ///
    /// # Errors
    /// - Invalid filter directives
    /// - A global subscriber is already installed
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = match &self.env_filter {
            Some(env_filter) => EnvFilter::try_new(env_filter)?,
            None => EnvFilter::try_new(self.verbosity_to_filter())?,
        };

        let fmt_layer: Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync> =
            match &self.output {
                TracingOutput::Console => match self.format {
                    TracingFormat::Console => fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(true)
                        .with_target(false)
                        .with_level(true)
                        .compact()
                        .boxed(),
                    TracingFormat::Compact => fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(false)
                        .with_target(false)
                        .compact()
                        .boxed(),
                    #[cfg(feature = "tracing-json")]
                    TracingFormat::Json => fmt::layer()
                        .with_writer(std::io::stderr)
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .boxed(),
                },

                #[cfg(feature = "tracing-files")]
                TracingOutput::File(path) => {
                    // Blocking writer: a non-blocking worker guard would have to
                    // outlive `init`.
                    let file_appender = tracing_appender::rolling::never(
                        path.parent()
                            .filter(|parent| !parent.as_os_str().is_empty())
                            .unwrap_or_else(|| std::path::Path::new(".")),
                        path.file_name()
                            .unwrap_or_else(|| std::ffi::OsStr::new("segdemo.log")),
                    );

                    match self.format {
                        TracingFormat::Console | TracingFormat::Compact => fmt::layer()
                            .with_writer(file_appender)
                            .with_ansi(false)
                            .compact()
                            .boxed(),
                        #[cfg(feature = "tracing-json")]
                        TracingFormat::Json => fmt::layer()
                            .with_writer(file_appender)
                            .json()
                            .with_current_span(true)
                            .with_span_list(true)
                            .boxed(),
                    }
                },
            };

        Registry::default().with(filter).with(fmt_layer).try_init()?;

        if let Some(session_id) = &self.session_id {
            tracing::debug!(session_id = %session_id, "segdemo session started");
        }

        Ok(())
    }
}

/// Initialize tracing with CLI defaults and a fresh session ID
///
/// `RUST_LOG`, when set, takes precedence over `verbosity`.
#[cfg(feature = "cli")]
pub fn init_cli_tracing(verbosity: u8) -> anyhow::Result<()> {
    let mut config = TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(TracingFormat::Console)
        .with_session_id(uuid::Uuid::new_v4().to_string());

    if let Ok(directives) = std::env::var("RUST_LOG") {
        if !directives.trim().is_empty() {
            config = config.with_env_filter(directives);
        }
    }

    config.init()
}
