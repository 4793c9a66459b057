//! # Channel Value Codec
//!
//! Converts calibrated pulse widths into 11-bit channel codes and packs
//! 16 of them into the 22-byte frame payload.

use super::protocol::*;

/// Convert a servo pulse width to an 11-bit channel code
///
/// The input is clamped to [`PULSE_MIN_US`]..=[`PULSE_MAX_US`], then mapped
/// linearly onto 0..=2047. The linear map reaches 2048 at the upper bound;
/// the final clamp saturates it at 2047 so the code always fits 11 bits.
/// Receiver firmware depends on this saturation, so it must stay.
///
/// # Arguments
///
/// * `pulse_us` - Pulse width in microseconds
///
/// # Returns
///
/// * `u16` - Channel code in 0..=2047, monotonic non-decreasing in the input
///
/// # Examples
///
/// ```
/// use multitx::multi::encoder::pulse_to_code;
///
/// assert_eq!(pulse_to_code(860), 0);
/// assert_eq!(pulse_to_code(1500), 1024);
/// assert_eq!(pulse_to_code(2140), 2047);
/// ```
pub fn pulse_to_code(pulse_us: u16) -> u16 {
    let clamped = pulse_us.clamp(PULSE_MIN_US, PULSE_MAX_US);
    let code = (u32::from(clamped - PULSE_MIN_US) * 8 / 5) as u16;
    code.min(CHANNEL_CODE_MAX)
}

/// Pack 16 channel pulse widths into the 22-byte frame payload
///
/// Each channel is encoded with [`pulse_to_code`] and the 11-bit codes are
/// packed as a continuous LSB-first bitstream, channel 0 first. Field
/// boundaries never byte-align except coincidentally:
///
/// ```text
/// Byte 0: Ch0[0:7]
/// Byte 1: Ch0[8:10] | Ch1[0:4]
/// Byte 2: Ch1[5:10] | Ch2[0:1]
/// ...
/// ```
///
/// # Algorithm
///
/// A widening `u32` accumulator buffers up to 18 valid low bits mid-loop:
/// each code is OR'd in at the current bit offset, and a byte is emitted
/// whenever 8 or more bits are buffered. 16 x 11 = 176 bits fills the
/// payload exactly, so no trailing flush is needed.
pub fn pack_channels(pulses: &[u16; CHANNEL_COUNT]) -> [u8; PACKED_PAYLOAD_SIZE] {
    let mut payload = [0u8; PACKED_PAYLOAD_SIZE];
    let mut bits: u32 = 0;
    let mut bits_available: u32 = 0;
    let mut index = 0;

    for &pulse in pulses.iter() {
        bits |= u32::from(pulse_to_code(pulse)) << bits_available;
        bits_available += CHANNEL_CODE_BITS;

        while bits_available >= 8 {
            payload[index] = (bits & 0xFF) as u8;
            bits >>= 8;
            bits_available -= 8;
            index += 1;
        }
    }

    payload
}
