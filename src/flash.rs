//! # Module Firmware Startup
//!
//! Starts the JP4in1 firmware through the STM32 bootloader before the serial
//! link is opened.
//!
//! When powered from USB the module's BOOT0 pin is hardwired, so it boots
//! into the bootloader instead of the firmware. `stm32flash -g 0x8002000`
//! jumps to the firmware entry point. If the firmware is already running
//! (red LED flashing) the jump fails harmlessly, which is why startup
//! failure is advisory rather than fatal.

use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

/// Firmware entry point address passed to stm32flash
pub const FIRMWARE_ENTRY_ADDRESS: &str = "0x8002000";

/// Collaborator that starts the remote module firmware
///
/// Injected into the startup path so the core is testable without an
/// external executable.
pub trait FirmwareStarter {
    /// Attempt to start the module firmware on the given port
    ///
    /// Returns `true` if the bootloader accepted the jump command. `false`
    /// is advisory: the module may already be running its firmware.
    fn start_firmware(&self, port: &str) -> bool;
}

/// `stm32flash`-based firmware starter
#[derive(Debug, Clone)]
pub struct Stm32Flash {
    executable: PathBuf,
}

impl Stm32Flash {
    /// Create a starter using the given stm32flash executable
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl FirmwareStarter for Stm32Flash {
    fn start_firmware(&self, port: &str) -> bool {
        info!(
            "Starting module firmware: {} -g {} {}",
            self.executable.display(),
            FIRMWARE_ENTRY_ADDRESS,
            port
        );

        let status = Command::new(&self.executable)
            .arg("-g")
            .arg(FIRMWARE_ENTRY_ADDRESS)
            .arg(port)
            .status();

        match status {
            Ok(status) if status.success() => {
                info!("Module firmware is running");
                true
            }
            Ok(status) => {
                warn!("stm32flash exited with {}; if the module firmware is already running (red LED flashing), ignore this", status);
                warn!("- is the module connected to the computer?");
                warn!("- has the module been flashed with the proper firmware?");
                warn!("- is a CP210x USB bridge driver installed?");
                warn!("- is the module mapped to {}?", port);
                false
            }
            Err(e) => {
                warn!("couldn't run {}: {}", self.executable.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_is_advisory() {
        let starter = Stm32Flash::new("/nonexistent/stm32flash_xyz");
        // Failure to spawn must come back as false, not a panic or error
        assert!(!starter.start_firmware("/dev/ttyUSB0"));
    }

    #[test]
    fn test_failing_command_returns_false() {
        // `false` exists on any unix box and exits non-zero
        let starter = Stm32Flash::new("false");
        assert!(!starter.start_firmware("/dev/ttyUSB0"));
    }

    #[test]
    fn test_succeeding_command_returns_true() {
        let starter = Stm32Flash::new("true");
        assert!(starter.start_firmware("/dev/ttyUSB0"));
    }
}
