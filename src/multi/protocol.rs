//! # Multi Serial Protocol Constants and Types
//!
//! Core protocol definitions for the JP4in1 multiprotocol module serial link.

use crate::error::{MultiTxError, Result};

/// Header byte for control and bind frames
pub const FRAME_HEADER_CONTROL: u8 = 0x55;

/// Header byte for failsafe-setup frames
pub const FRAME_HEADER_FAILSAFE: u8 = 0x57;

/// Bind flag OR'd into the protocol id byte of a bind frame
pub const BIND_FLAG: u8 = 0x80;

/// Dummy protocol id sent in the priming frame
///
/// A protocol-change frame carrying this id forces the module out of
/// whatever state it is in so it can subsequently accept a bind command.
pub const PRIMING_PROTOCOL_ID: u8 = 0x01;

/// Number of RC channels carried per frame
pub const CHANNEL_COUNT: usize = 16;

/// Width of one packed channel code in bits
pub const CHANNEL_CODE_BITS: u32 = 11;

/// Packed channels payload size (22 bytes for 16 channels x 11 bits)
pub const PACKED_PAYLOAD_SIZE: usize = 22;

/// Complete frame size (4-byte header + packed payload)
pub const FRAME_SIZE: usize = 26;

/// Pulse width range accepted by the codec, in microseconds.
///
/// Values outside this range are silently clamped before encoding, never
/// rejected: saturating a transient out-of-range input is safer than
/// aborting a real-time control loop.
pub const PULSE_MIN_US: u16 = 860;
pub const PULSE_MAX_US: u16 = 2140;

/// Neutral servo position in microseconds
pub const PULSE_NEUTRAL_US: u16 = 1500;

/// Channel code range (11-bit: 0-2047)
pub const CHANNEL_CODE_MAX: u16 = 2047;

/// Target RF protocol family
///
/// The discriminants are the protocol ids the module expects on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProtocolId {
    /// FrSky "D8" protocol
    FrSkyD = 3,
    /// FrSky ACCST V1 "D16" protocol
    FrSkyX = 15,
    /// FrSky older "V8" protocol
    FrSkyV = 25,
}

impl ProtocolId {
    /// Wire protocol id byte
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Look up a protocol family by its wire id
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedProtocol` for any id other than 3, 15 or 25.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            3 => Ok(Self::FrSkyD),
            15 => Ok(Self::FrSkyX),
            25 => Ok(Self::FrSkyV),
            other => Err(MultiTxError::UnsupportedProtocol(other)),
        }
    }

    /// Look up a protocol family by its configuration name
    ///
    /// Accepted names (case-insensitive): `"d8"`, `"d16"`, `"v8"`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProtocolName` for any other name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "d8" => Ok(Self::FrSkyD),
            "d16" => Ok(Self::FrSkyX),
            "v8" => Ok(Self::FrSkyV),
            other => Err(MultiTxError::UnknownProtocolName(other.to_string())),
        }
    }

    /// Human-readable family name (matches the configuration spelling)
    pub fn name(self) -> &'static str {
        match self {
            Self::FrSkyD => "d8",
            Self::FrSkyX => "d16",
            Self::FrSkyV => "v8",
        }
    }
}

impl std::fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (id {})", self.name(), self.id())
    }
}

/// Ordered set of 16 channel pulse widths in microseconds
///
/// The caller mutates values between sends; each control frame re-encodes
/// the current contents. Pulse values are not validated here, they are
/// clamped to [`PULSE_MIN_US`]..=[`PULSE_MAX_US`] at encode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSet {
    pulses: [u16; CHANNEL_COUNT],
}

impl ChannelSet {
    /// Create a channel set with every channel at the given pulse width
    pub fn filled(pulse_us: u16) -> Self {
        Self {
            pulses: [pulse_us; CHANNEL_COUNT],
        }
    }

    /// Create a channel set from explicit per-channel values
    pub fn from_pulses(pulses: [u16; CHANNEL_COUNT]) -> Self {
        Self { pulses }
    }

    /// Set one channel's pulse width
    ///
    /// # Errors
    ///
    /// Returns `ChannelIndex` if `index` is not in 0..16. The pulse value
    /// itself is never rejected.
    pub fn set(&mut self, index: usize, pulse_us: u16) -> Result<()> {
        let slot = self
            .pulses
            .get_mut(index)
            .ok_or(MultiTxError::ChannelIndex(index))?;
        *slot = pulse_us;
        Ok(())
    }

    /// Get one channel's pulse width
    ///
    /// # Errors
    ///
    /// Returns `ChannelIndex` if `index` is not in 0..16.
    pub fn get(&self, index: usize) -> Result<u16> {
        self.pulses
            .get(index)
            .copied()
            .ok_or(MultiTxError::ChannelIndex(index))
    }

    /// Raw pulse array, in channel order
    pub fn pulses(&self) -> &[u16; CHANNEL_COUNT] {
        &self.pulses
    }
}

impl Default for ChannelSet {
    /// All channels at neutral (1500 us)
    fn default() -> Self {
        Self::filled(PULSE_NEUTRAL_US)
    }
}
