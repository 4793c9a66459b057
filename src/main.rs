//! # MultiTx
//!
//! Drive a JP4in1 multiprotocol RF transmitter module over USB serial.
//!
//! Starts the module firmware through the STM32 bootloader, opens the
//! serial link, optionally runs a bind sequence, pushes the no-pulse
//! failsafe policy, then streams control frames until Ctrl+C.

use anyhow::Result;
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_subscriber;

use multitx::config::Config;
use multitx::flash::{FirmwareStarter, Stm32Flash};
use multitx::serial::MultiSerial;
use multitx::session::Session;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for MultiTx
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first CLI argument, or `config/default.toml`)
///    - Start the module firmware via stm32flash (advisory; the module may
///      already be running)
///    - Open the serial link at 50000 baud 8E2
///
/// 2. **Link setup**
///    - If bind is enabled: priming burst, then bind frames for the
///      configured duration (receivers must be rebooted after bind)
///    - If failsafe configuration is enabled: push the no-pulse policy
///
/// 3. **Streaming**
///    - Send control frames at the configured period until Ctrl+C; the
///      module requires one frame at least every 70ms
///
/// # Errors
///
/// Returns error if:
/// - Configuration is missing or invalid
/// - Serial port cannot be opened
/// - A frame write fails
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("MultiTx v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;
    let protocol = config.protocol_id()?;
    info!("Loaded {} - protocol {}", config_path, protocol);

    // Start the module firmware before touching the port; failure is
    // advisory since the firmware may already be running
    if config.flash.enabled {
        let starter = Stm32Flash::new(config.flash.executable.as_str());
        if !starter.start_firmware(&config.serial.port) {
            warn!("Firmware start not confirmed; continuing anyway");
        }
    }

    let port = MultiSerial::open(&config.serial.port)?;
    info!("Module link open at: {}", port.device_path());

    let mut session = Session::new(port, protocol);

    if config.bind.enabled {
        info!(
            "Bind enabled: broadcasting for {}s (reboot receivers afterwards)",
            config.bind.duration_s
        );
        session.bind(Duration::from_secs(config.bind.duration_s)).await?;
    }

    if config.failsafe.configure {
        session.configure_failsafe().await?;
    }

    info!(
        "Streaming channels every {}ms; press Ctrl+C to exit",
        config.stream.period_ms
    );
    let sent = session
        .stream(
            Duration::from_millis(config.stream.period_ms),
            tokio::signal::ctrl_c(),
        )
        .await?;

    info!("Total control frames sent: {}", sent);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_default_config_is_valid() {
        let config = Config::load(DEFAULT_CONFIG_PATH)
            .expect("shipped config/default.toml must load and validate");

        // The defaults must not trip the module's 70ms streaming deadline
        assert!(config.stream.period_ms <= 70);
        assert!(config.protocol_id().is_ok());
    }
}
