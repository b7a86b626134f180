//! Client configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with UBQC_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ubqc_ir::SingleQubitGate;

use crate::error::{ClientError, ClientResult};
use crate::orchestrator::RunOptions;

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Receive timeout in milliseconds; unset waits forever
    #[serde(default)]
    pub recv_timeout_ms: Option<u64>,

    /// Log backend state snapshots at trace level
    #[serde(default)]
    pub trace_states: bool,

    /// Gates applied to the inputs before blinding, e.g. `["H", "rot_Z(64)"]`
    #[serde(default)]
    pub input_gates: Vec<String>,

    /// Gates applied to the outputs before measuring
    #[serde(default)]
    pub output_gates: Vec<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive, e.g. "info" or "ubqc_client=trace"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> ClientResult<Self> {
        let config: ClientConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        ClientConfig::default().merge_env()
    }

    /// Load the file if given, then apply environment overrides.
    pub fn load(config_file: Option<&str>) -> ClientResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => ClientConfig::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variables set in the process environment.
    pub fn merge_env(self) -> Self {
        self.merge_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`.
    ///
    /// Variables:
    /// - `UBQC_RECV_TIMEOUT_MS`: receive timeout in milliseconds
    /// - `UBQC_TRACE_STATES`: "true"/"1" to enable state snapshots
    /// - `UBQC_INPUT_GATES`, `UBQC_OUTPUT_GATES`: comma-separated gate lists
    /// - `UBQC_LOG_FORMAT`: "console" or "json"
    /// - `RUST_LOG`: log filter
    ///
    /// Unparseable numeric or boolean values are ignored.
    pub fn merge_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("UBQC_RECV_TIMEOUT_MS") {
            if let Ok(ms) = v.trim().parse() {
                self.recv_timeout_ms = Some(ms);
            }
        }
        if let Some(v) = lookup("UBQC_TRACE_STATES") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.trace_states = true,
                "0" | "false" | "no" => self.trace_states = false,
                _ => {}
            }
        }
        if let Some(v) = lookup("UBQC_INPUT_GATES") {
            self.input_gates = split_gate_list(&v);
        }
        if let Some(v) = lookup("UBQC_OUTPUT_GATES") {
            self.output_gates = split_gate_list(&v);
        }
        if let Some(v) = lookup("UBQC_LOG_FORMAT") {
            self.logging.format = v;
        }
        if let Some(v) = lookup("RUST_LOG") {
            self.logging.level = v;
        }
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        if self.recv_timeout_ms == Some(0) {
            return Err(ClientError::Configuration(
                "recv_timeout_ms must be greater than zero".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "console" | "json") {
            return Err(ClientError::Configuration(format!(
                "unknown log format '{}', expected 'console' or 'json'",
                self.logging.format
            )));
        }
        parse_gates(&self.input_gates)?;
        parse_gates(&self.output_gates)?;
        Ok(())
    }

    /// Receive timeout as a [`Duration`].
    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout_ms.map(Duration::from_millis)
    }

    /// Build the orchestrator options, parsing the gate lists.
    pub fn run_options(&self) -> ClientResult<RunOptions> {
        Ok(RunOptions {
            recv_timeout: self.recv_timeout(),
            trace_states: self.trace_states,
            input_gates: parse_gates(&self.input_gates)?,
            output_gates: parse_gates(&self.output_gates)?,
        })
    }
}

/// Split `"H,rot_Z(64), X"` into gate names.
fn split_gate_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_gates(names: &[String]) -> ClientResult<Vec<SingleQubitGate>> {
    names
        .iter()
        .map(|name| {
            name.parse::<SingleQubitGate>()
                .map_err(|e| ClientError::Configuration(e.to_string()))
        })
        .collect()
}
