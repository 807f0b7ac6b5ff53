//! Configuration file management for ocspchecker.
//!
//! This module handles loading, parsing, and merging configuration from TOML files
//! and command-line arguments, and resolving the result into the [`CheckConfig`]
//! a revocation check runs with.
//!
//! # Configuration Precedence
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (ocspchecker.toml or specified with --config)
//! 3. Command-line arguments (highest priority)
//!
//! # Example Configuration File
//!
//! ```toml
//! host = "example.com"
//! port = 443
//! skip_host_verify = false
//! verbose = true
//! output = "text"
//! strict_freshness = false
//!
//! [prometheus]
//! enabled = true
//! address = "http://localhost:9091"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::report::OutputFormat;
use crate::response::FreshnessPolicy;

/// Configuration file looked up in the working directory when `--config`
/// is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ocspchecker.toml";

/// Main configuration structure for ocspchecker.
///
/// All fields are optional to support partial configuration and merging.
/// Missing values will be filled in by defaults or overridden by CLI arguments.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Host to connect to
    pub host: Option<String>,
    /// Port to connect to
    pub port: Option<u16>,
    /// Disable certificate chain and hostname verification during the handshake
    pub skip_host_verify: Option<bool>,
    /// List the certificate chain and responder URL
    pub verbose: Option<bool>,
    /// Output format: text, json, summary
    pub output: Option<OutputFormat>,
    /// Fail on OCSP responses past their nextUpdate
    pub strict_freshness: Option<bool>,
    /// Prometheus configuration
    pub prometheus: Option<PrometheusConfig>,
}

/// Prometheus integration configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PrometheusConfig {
    /// Enable prometheus metrics pushing
    pub enabled: Option<bool>,
    /// Prometheus push gateway address (e.g., "http://localhost:9091")
    pub address: Option<String>,
}

/// Everything a single revocation check needs to know about its target.
///
/// Built once from the merged [`Config`] and passed by reference into the
/// pipeline, so checks against different targets can run side by side in
/// the same process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    pub host: String,
    pub port: u16,
    pub skip_host_verify: bool,
    pub freshness: FreshnessPolicy,
}

impl CheckConfig {
    /// Target with handshake verification on and lenient freshness.
    pub fn new(host: &str, port: u16) -> Self {
        CheckConfig {
            host: host.to_string(),
            port,
            skip_host_verify: false,
            freshness: FreshnessPolicy::Lenient,
        }
    }
}

impl Default for Config {
    /// Creates a default configuration.
    ///
    /// # Default Values
    ///
    /// - `host`: "localhost"
    /// - `port`: 443
    /// - `skip_host_verify`: false
    /// - `verbose`: false
    /// - `output`: text
    /// - `strict_freshness`: false
    /// - `prometheus.enabled`: false
    /// - `prometheus.address`: "http://localhost:9091"
    fn default() -> Self {
        Config {
            host: Some("localhost".to_string()),
            port: Some(443),
            skip_host_verify: Some(false),
            verbose: Some(false),
            output: Some(OutputFormat::Text),
            strict_freshness: Some(false),
            prometheus: Some(PrometheusConfig {
                enabled: Some(false),
                address: Some("http://localhost:9091".to_string()),
            }),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid TOML
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use ocspchecker::config::Config;
    /// let config = Config::from_file("ocspchecker.toml")?;
    /// # Ok::<(), ocspchecker::config::ConfigError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// A configuration with nothing set; merging it changes nothing.
    pub fn empty() -> Self {
        Config {
            host: None,
            port: None,
            skip_host_verify: None,
            verbose: None,
            output: None,
            strict_freshness: None,
            prometheus: None,
        }
    }

    /// Merges this configuration with another, prioritizing the other's values.
    ///
    /// For each field, if the `other` config has a value (Some), it overrides
    /// this config's value. If the `other` value is None, keeps the current value.
    ///
    /// # Example
    ///
    /// ```
    /// # use ocspchecker::config::Config;
    /// let file_config = Config::from_file("ocspchecker.toml").unwrap_or_else(|_| Config::empty());
    /// let merged = Config::default().merge_with(file_config);
    /// assert!(merged.host.is_some());
    /// ```
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.skip_host_verify.is_some() {
            self.skip_host_verify = other.skip_host_verify;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.strict_freshness.is_some() {
            self.strict_freshness = other.strict_freshness;
        }
        if let Some(other_prom) = other.prometheus {
            if let Some(ref mut self_prom) = self.prometheus {
                if other_prom.enabled.is_some() {
                    self_prom.enabled = other_prom.enabled;
                }
                if other_prom.address.is_some() {
                    self_prom.address = other_prom.address;
                }
            } else {
                self.prometheus = Some(other_prom);
            }
        }
        self
    }

    /// Resolves the merged configuration into the settings of one check.
    ///
    /// # Returns
    ///
    /// * `Ok(CheckConfig)` - Host and port are usable
    /// * `Err(ConfigError::Validation)` - Host is missing or empty, or port is 0
    pub fn resolve(&self) -> Result<CheckConfig, ConfigError> {
        let host = match self.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(ConfigError::Validation("host cannot be empty".to_string())),
        };
        let port = match self.port {
            Some(0) => {
                return Err(ConfigError::Validation(
                    "port must be between 1 and 65535".to_string(),
                ))
            }
            Some(port) => port,
            None => 443,
        };
        let freshness = if self.strict_freshness.unwrap_or(false) {
            FreshnessPolicy::Strict
        } else {
            FreshnessPolicy::Lenient
        };

        Ok(CheckConfig {
            host,
            port,
            skip_host_verify: self.skip_host_verify.unwrap_or(false),
            freshness,
        })
    }

    /// Prometheus push gateway address, when pushing is enabled.
    pub fn prometheus_address(&self) -> Option<&str> {
        let prometheus = self.prometheus.as_ref()?;
        if prometheus.enabled.unwrap_or(false) {
            prometheus.address.as_deref()
        } else {
            None
        }
    }

    /// Generates an example configuration file in TOML format.
    ///
    /// # Example
    ///
    /// ```
    /// # use ocspchecker::config::Config;
    /// let example = Config::example_toml();
    /// assert!(example.contains("host"));
    /// ```
    pub fn example_toml() -> String {
        let example = Config {
            host: Some("example.com".to_string()),
            port: Some(443),
            skip_host_verify: Some(false),
            verbose: Some(true),
            output: Some(OutputFormat::Text),
            strict_freshness: Some(false),
            prometheus: Some(PrometheusConfig {
                enabled: Some(false),
                address: Some("http://localhost:9091".to_string()),
            }),
        };

        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
    /// Validation error (missing required fields, invalid values, etc.)
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
            host = "jpbd.dev"
            port = 8443
            skip_host_verify = true
            output = "json"
            strict_freshness = true

            [prometheus]
            enabled = true
            address = "http://localhost:9092"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();

        assert_eq!(config.host, Some("jpbd.dev".to_string()));
        assert_eq!(config.port, Some(8443));
        assert_eq!(config.skip_host_verify, Some(true));
        assert_eq!(config.verbose, None);
        assert_eq!(config.output, Some(OutputFormat::Json));
        assert_eq!(config.strict_freshness, Some(true));

        let prometheus = config.prometheus.unwrap();
        assert_eq!(prometheus.enabled, Some(true));
        assert_eq!(
            prometheus.address,
            Some("http://localhost:9092".to_string())
        );
    }

    #[test]
    fn test_config_merge() {
        let base_config = Config::default();

        let override_config = Config {
            host: Some("override.com".to_string()),
            port: None,
            verbose: Some(true),
            prometheus: Some(PrometheusConfig {
                enabled: Some(true),
                address: None,
            }),
            ..Config::empty()
        };

        let merged = base_config.merge_with(override_config);

        assert_eq!(merged.host, Some("override.com".to_string())); // Overridden
        assert_eq!(merged.port, Some(443)); // From base
        assert_eq!(merged.verbose, Some(true)); // Overridden
        assert_eq!(merged.output, Some(OutputFormat::Text)); // From base

        let prometheus = merged.prometheus.unwrap();
        assert_eq!(prometheus.enabled, Some(true)); // Overridden
        assert_eq!(
            prometheus.address,
            Some("http://localhost:9091".to_string())
        ); // From base
    }

    #[test]
    fn test_merge_with_empty_changes_nothing() {
        assert_eq!(
            Config::default().merge_with(Config::empty()),
            Config::default()
        );
    }

    #[test]
    fn test_resolve_defaults() {
        let check = Config::default().resolve().unwrap();
        assert_eq!(check, CheckConfig::new("localhost", 443));
        assert_eq!(check.freshness, FreshnessPolicy::Lenient);
    }

    #[test]
    fn test_resolve_strict_and_skip_verify() {
        let config = Config {
            host: Some("example.com".to_string()),
            port: Some(8443),
            skip_host_verify: Some(true),
            strict_freshness: Some(true),
            ..Config::empty()
        };
        let check = config.resolve().unwrap();
        assert_eq!(check.host, "example.com");
        assert_eq!(check.port, 8443);
        assert!(check.skip_host_verify);
        assert_eq!(check.freshness, FreshnessPolicy::Strict);
    }

    #[test]
    fn test_resolve_rejects_empty_host_and_zero_port() {
        let empty_host = Config {
            host: Some("  ".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            empty_host.resolve(),
            Err(ConfigError::Validation(_))
        ));

        let zero_port = Config {
            port: Some(0),
            ..Config::default()
        };
        assert!(matches!(zero_port.resolve(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_prometheus_address_only_when_enabled() {
        assert_eq!(Config::default().prometheus_address(), None);

        let enabled = Config::default().merge_with(Config {
            prometheus: Some(PrometheusConfig {
                enabled: Some(true),
                address: None,
            }),
            ..Config::empty()
        });
        assert_eq!(enabled.prometheus_address(), Some("http://localhost:9091"));
    }

    #[test]
    fn test_invalid_toml() {
        let invalid_toml = "host = [invalid toml";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        let result = Config::from_file(temp_file.path());
        assert!(result.is_err());

        match result.unwrap_err() {
            ConfigError::Parse(_) => {} // Expected
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_example_toml_generation() {
        let example = Config::example_toml();

        // Should be valid TOML
        let parsed: Config = toml::from_str(&example).unwrap();

        assert_eq!(parsed.host, Some("example.com".to_string()));
        assert_eq!(parsed.output, Some(OutputFormat::Text));
        assert!(parsed.prometheus.is_some());
    }
}
