//! Configuration for annex-remote
//!
//! Session settings with sensible defaults.

/// Main configuration for a protocol session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Version announced in the first line of every session (`VERSION <n>`)
    pub protocol_version: u32,

    /// Extensions listed in the reply to the host's `EXTENSIONS` request
    pub extensions: Vec<String>,

    // -------------------------------------------------------------------------
    // Logging Configuration
    // -------------------------------------------------------------------------
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocol_version: 1,
            extensions: Vec::new(),
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the announced protocol version
    pub fn protocol_version(mut self, version: u32) -> Self {
        self.config.protocol_version = version;
        self
    }

    /// Add an extension to advertise in the `EXTENSIONS` reply
    pub fn extension(mut self, name: impl Into<String>) -> Self {
        self.config.extensions.push(name.into());
        self
    }

    /// Replace the advertised extensions
    pub fn extensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extensions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the fallback tracing filter
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
