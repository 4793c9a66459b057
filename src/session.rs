//! # Session Sequencer
//!
//! Drives the timed frame sequence the multiprotocol module expects: a
//! priming burst, an optional timed bind burst, a failsafe-configuration
//! burst, then the steady-state control stream.
//!
//! A single task owns the port and sends frames strictly sequentially.
//! Delays between frames are advisory pacing, not precise timers; the one
//! hard timing contract is the module's 70 ms control-frame deadline, which
//! is the caller's obligation (see [`Session::send_control`]).

use crate::error::{MultiTxError, Result};
use crate::multi::frame::{bind_frame, control_frame, failsafe_frame, priming_frame};
use crate::multi::protocol::{ChannelSet, ProtocolId};
use crate::serial::port_trait::SerialPortIO;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, sleep, Instant};
use tracing::{debug, info};

/// Number of frames in the priming and failsafe bursts
///
/// The protocol has no acknowledgements; repetition is its only defense
/// against dropped bytes on the link.
pub const BURST_COUNT: usize = 10;

/// Pacing delay between frames in bursts and during bind
pub const INTER_FRAME_DELAY: Duration = Duration::from_millis(50);

/// Number of streamed frames between progress log messages
const LOG_INTERVAL_FRAMES: u64 = 500;

/// Maximum interval between control frames before the module declares the
/// link lost and applies its failsafe policy
///
/// Not enforced (or even detectable) in software; the host must keep every
/// gap between [`Session::send_control`] calls under this bound while
/// streaming.
pub const CONTROL_DEADLINE: Duration = Duration::from_millis(70);

/// Link session with the multiprotocol module
///
/// Exclusively owns the serial port for the session's lifetime. The caller
/// mutates channel values through [`Session::channels_mut`] between sends;
/// every control frame re-encodes the current values.
#[derive(Debug)]
pub struct Session<P: SerialPortIO> {
    port: P,
    protocol: ProtocolId,
    channels: ChannelSet,
}

impl<P: SerialPortIO> Session<P> {
    /// Create a session for the given protocol family
    ///
    /// Channels start at neutral (1500 us).
    pub fn new(port: P, protocol: ProtocolId) -> Self {
        Self {
            port,
            protocol,
            channels: ChannelSet::default(),
        }
    }

    /// Selected protocol family (immutable for the session)
    pub fn protocol(&self) -> ProtocolId {
        self.protocol
    }

    /// Current channel values
    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// Mutable access to the channel values
    pub fn channels_mut(&mut self) -> &mut ChannelSet {
        &mut self.channels
    }

    /// Send the priming burst
    ///
    /// Emits the dummy protocol-change frame [`BURST_COUNT`] times,
    /// [`INTER_FRAME_DELAY`] apart. The module cannot accept a bind command
    /// until this has run.
    pub async fn prime(&mut self) -> Result<()> {
        debug!("Priming module ({} frames)", BURST_COUNT);
        let frame = priming_frame();
        for _ in 0..BURST_COUNT {
            self.send_frame(&frame).await?;
            sleep(INTER_FRAME_DELAY).await;
        }
        Ok(())
    }

    /// Broadcast bind frames for the given duration
    ///
    /// Runs the priming burst first, then re-builds and sends a bind frame
    /// every [`INTER_FRAME_DELAY`] until the wall-clock duration elapses.
    /// Several receivers can be bound simultaneously; they must be rebooted
    /// after bind.
    ///
    /// # Errors
    ///
    /// Returns `Serial` if a write fails. Writes are not retried.
    pub async fn bind(&mut self, duration: Duration) -> Result<()> {
        self.prime().await?;

        info!("Sending bind frames for {:?}", duration);
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            let frame = bind_frame(self.protocol, &self.channels);
            self.send_frame(&frame).await?;
            sleep(INTER_FRAME_DELAY).await;
        }
        Ok(())
    }

    /// Configure the module's failsafe policy to "no pulse"
    ///
    /// Emits the failsafe-setup frame [`BURST_COUNT`] times,
    /// [`INTER_FRAME_DELAY`] apart, so the module reliably latches the
    /// policy despite possible dropped bytes.
    pub async fn configure_failsafe(&mut self) -> Result<()> {
        info!("Configuring no-pulse failsafe");
        let frame = failsafe_frame(self.protocol);
        for _ in 0..BURST_COUNT {
            self.send_frame(&frame).await?;
            sleep(INTER_FRAME_DELAY).await;
        }
        Ok(())
    }

    /// Send one control frame carrying the current channel values
    ///
    /// While streaming, this must be called at least once every
    /// [`CONTROL_DEADLINE`] or the module declares the link lost and enters
    /// its own failsafe behavior. That deadline is a contract with the
    /// module, not something this crate can detect or report.
    pub async fn send_control(&mut self) -> Result<()> {
        let frame = control_frame(self.protocol, &self.channels);
        self.send_frame(&frame).await
    }

    /// Stream control frames until the shutdown future resolves
    ///
    /// Steady-state operation: sends one control frame per `period` tick,
    /// re-encoding the channel values each time. `period` must be at most
    /// [`CONTROL_DEADLINE`]. There is no in-band exit; the loop runs until
    /// `shutdown` resolves (e.g., a Ctrl+C signal or a test timer).
    ///
    /// # Returns
    ///
    /// * `Result<u64>` - Number of control frames sent
    pub async fn stream<F: Future>(&mut self, period: Duration, shutdown: F) -> Result<u64> {
        info!(
            "Streaming control frames every {:?} (deadline {:?})",
            period, CONTROL_DEADLINE
        );

        let mut ticker = interval(period);
        tokio::pin!(shutdown);
        let mut frames_sent: u64 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.send_control().await?;
                    frames_sent += 1;

                    if frames_sent % LOG_INTERVAL_FRAMES == 0 {
                        info!("Sent {} control frames", frames_sent);
                    }
                }
                _ = &mut shutdown => {
                    info!("Streaming stopped after {} frames", frames_sent);
                    break;
                }
            }
        }

        Ok(frames_sent)
    }

    async fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.port
            .write_all(frame)
            .await
            .map_err(|e| MultiTxError::Serial(format!("Failed to write frame: {}", e)))?;
        self.port
            .flush()
            .await
            .map_err(|e| MultiTxError::Serial(format!("Failed to flush serial port: {}", e)))?;

        debug!("Sent frame ({} bytes)", frame.len());
        Ok(())
    }
}
