//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::multi::protocol::ProtocolId;
use crate::serial::MULTI_BAUD_RATE;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub protocol: ProtocolConfig,

    #[serde(default)]
    pub bind: BindConfig,

    #[serde(default)]
    pub failsafe: FailsafeConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub flash: FlashConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// RF protocol selection
#[derive(Debug, Deserialize, Clone)]
pub struct ProtocolConfig {
    /// Protocol family: "d8", "d16" or "v8", matching the receiver series
    #[serde(default = "default_protocol_family")]
    pub family: String,
}

/// Bind sequence configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BindConfig {
    /// Whether to broadcast bind frames at session start (only needed the
    /// first time a receiver is paired)
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_bind_duration_s")]
    pub duration_s: u64,
}

/// Failsafe configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FailsafeConfig {
    /// Whether to push the no-pulse failsafe policy to the module before
    /// streaming starts
    #[serde(default = "default_failsafe_configure")]
    pub configure: bool,
}

/// Streaming configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    /// Pause between control frames; must stay under the module's 70ms
    /// link-loss deadline
    #[serde(default = "default_stream_period_ms")]
    pub period_ms: u64,
}

/// Firmware startup configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FlashConfig {
    #[serde(default = "default_flash_enabled")]
    pub enabled: bool,

    /// stm32flash executable (name on PATH or absolute path)
    #[serde(default = "default_flash_executable")]
    pub executable: String,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { MULTI_BAUD_RATE }

fn default_protocol_family() -> String { "d8".to_string() }

fn default_bind_duration_s() -> u64 { 5 }
fn default_failsafe_configure() -> bool { true }

fn default_stream_period_ms() -> u64 { 20 }

fn default_flash_enabled() -> bool { true }
fn default_flash_executable() -> String { "stm32flash".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            family: default_protocol_family(),
        }
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            duration_s: default_bind_duration_s(),
        }
    }
}

impl Default for FailsafeConfig {
    fn default() -> Self {
        Self {
            configure: default_failsafe_configure(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            period_ms: default_stream_period_ms(),
        }
    }
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            enabled: default_flash_enabled(),
            executable: default_flash_executable(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use multitx::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Selected protocol family
    ///
    /// # Errors
    ///
    /// Returns error if the configured family name is unknown (already
    /// caught by `validate`, so only reachable on hand-built configs).
    pub fn protocol_id(&self) -> Result<ProtocolId> {
        ProtocolId::from_name(&self.protocol.family)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(crate::error::MultiTxError::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        // The module's USART runs at a fixed rate
        if self.serial.baud_rate != MULTI_BAUD_RATE {
            return Err(crate::error::MultiTxError::Config(
                toml::de::Error::custom(format!(
                    "baud_rate must be {} (fixed by the module firmware)",
                    MULTI_BAUD_RATE
                ))
            ));
        }

        if let Err(e) = ProtocolId::from_name(&self.protocol.family) {
            return Err(crate::error::MultiTxError::Config(
                toml::de::Error::custom(e.to_string())
            ));
        }

        if self.bind.duration_s == 0 || self.bind.duration_s > 300 {
            return Err(crate::error::MultiTxError::Config(
                toml::de::Error::custom("bind duration_s must be between 1 and 300")
            ));
        }

        // A frame must go out at least every 70ms or the module declares
        // the link lost
        if self.stream.period_ms == 0 || self.stream.period_ms > 70 {
            return Err(crate::error::MultiTxError::Config(
                toml::de::Error::custom("stream period_ms must be between 1 and 70")
            ));
        }

        if self.flash.enabled && self.flash.executable.is_empty() {
            return Err(crate::error::MultiTxError::Config(
                toml::de::Error::custom("flash executable cannot be empty when enabled")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str).map_err(crate::error::MultiTxError::from)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("").unwrap();

        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 50_000);
        assert_eq!(config.protocol.family, "d8");
        assert!(!config.bind.enabled);
        assert_eq!(config.bind.duration_s, 5);
        assert!(config.failsafe.configure);
        assert_eq!(config.stream.period_ms, 20);
        assert!(config.flash.enabled);
        assert_eq!(config.flash.executable, "stm32flash");
    }

    #[test]
    fn test_full_config_parses() {
        let config = parse(
            r#"
            [serial]
            port = "/dev/ttyACM1"
            baud_rate = 50000

            [protocol]
            family = "d16"

            [bind]
            enabled = true
            duration_s = 10

            [failsafe]
            configure = false

            [stream]
            period_ms = 50

            [flash]
            enabled = false
            executable = "./stm32flash_linux64"
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.port, "/dev/ttyACM1");
        assert_eq!(config.protocol_id().unwrap(), ProtocolId::FrSkyX);
        assert!(config.bind.enabled);
        assert_eq!(config.bind.duration_s, 10);
        assert!(!config.failsafe.configure);
        assert_eq!(config.stream.period_ms, 50);
        assert!(!config.flash.enabled);
    }

    #[test]
    fn test_rejects_wrong_baud_rate() {
        let result = parse("[serial]\nbaud_rate = 115200\n");
        assert!(result.is_err(), "only the module's fixed 50000 baud is valid");
    }

    #[test]
    fn test_rejects_unknown_protocol_family() {
        let result = parse("[protocol]\nfamily = \"sbus\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_period_over_deadline() {
        let result = parse("[stream]\nperiod_ms = 71\n");
        assert!(result.is_err(), "period over 70ms would trip the module's failsafe");

        let result = parse("[stream]\nperiod_ms = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_bind_duration() {
        let result = parse("[bind]\nduration_s = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_flash_executable_when_enabled() {
        let result = parse("[flash]\nenabled = true\nexecutable = \"\"\n");
        assert!(result.is_err());

        // An empty executable is fine when firmware startup is disabled
        let config = parse("[flash]\nenabled = false\nexecutable = \"\"\n").unwrap();
        assert!(!config.flash.enabled);
    }

    #[test]
    fn test_rejects_empty_serial_port() {
        let result = parse("[serial]\nport = \"\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[serial]\nport = \"/dev/ttyUSB1\"\n\n[protocol]\nfamily = \"v8\"\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.protocol_id().unwrap(), ProtocolId::FrSkyV);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Config::load("/nonexistent/multitx.toml");
        match result.unwrap_err() {
            crate::error::MultiTxError::Io(_) => {}
            other => panic!("Expected Io error, got: {:?}", other),
        }
    }
}
