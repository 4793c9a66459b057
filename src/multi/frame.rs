//! # Frame Builder
//!
//! Assembles the four Multi serial frame kinds. Every builder is a pure
//! function of its inputs producing a fresh 26-byte frame; frames are never
//! reused between transmissions.

use super::encoder::pack_channels;
use super::protocol::*;

/// Build a control frame streaming the current channel values
///
/// Layout: `[0x55, protocol id, 0x00, 0x00]` followed by the 22-byte packed
/// payload. The payload is re-packed on every call since channel values may
/// have changed since the last send.
///
/// # Examples
///
/// ```
/// use multitx::multi::frame::control_frame;
/// use multitx::multi::protocol::{ChannelSet, ProtocolId};
///
/// let frame = control_frame(ProtocolId::FrSkyD, &ChannelSet::default());
/// assert_eq!(frame.len(), 26);
/// assert_eq!(frame[0], 0x55);
/// assert_eq!(frame[1], 3);
/// ```
pub fn control_frame(protocol: ProtocolId, channels: &ChannelSet) -> Vec<u8> {
    frame_with_payload(FRAME_HEADER_CONTROL, protocol.id(), &pack_channels(channels.pulses()))
}

/// Build a bind frame
///
/// Identical to a control frame except the protocol id byte carries
/// [`BIND_FLAG`], telling idle receivers to learn the transmitter address.
pub fn bind_frame(protocol: ProtocolId, channels: &ChannelSet) -> Vec<u8> {
    frame_with_payload(
        FRAME_HEADER_CONTROL,
        protocol.id() | BIND_FLAG,
        &pack_channels(channels.pulses()),
    )
}

/// Build the priming frame sent at session start
///
/// A dummy protocol-change frame (id [`PRIMING_PROTOCOL_ID`], zero payload)
/// that forces the module out of its current state so a subsequent bind
/// command is accepted.
pub fn priming_frame() -> Vec<u8> {
    frame_with_payload(
        FRAME_HEADER_CONTROL,
        PRIMING_PROTOCOL_ID,
        &[0u8; PACKED_PAYLOAD_SIZE],
    )
}

/// Build a failsafe-setup frame
///
/// The 0x57 header selects "configure failsafe" rather than "stream
/// channels". The frame sets the no-pulse-on-signal-loss policy, so the
/// payload content is irrelevant and stays zero-filled.
pub fn failsafe_frame(protocol: ProtocolId) -> Vec<u8> {
    frame_with_payload(
        FRAME_HEADER_FAILSAFE,
        protocol.id(),
        &[0u8; PACKED_PAYLOAD_SIZE],
    )
}

fn frame_with_payload(header: u8, id: u8, payload: &[u8; PACKED_PAYLOAD_SIZE]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(FRAME_SIZE);
    frame.extend_from_slice(&[header, id, 0x00, 0x00]);
    frame.extend_from_slice(payload);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PROTOCOLS: [ProtocolId; 3] =
        [ProtocolId::FrSkyD, ProtocolId::FrSkyX, ProtocolId::FrSkyV];

    #[test]
    fn test_control_frame_structure() {
        for protocol in ALL_PROTOCOLS {
            let frame = control_frame(protocol, &ChannelSet::default());

            assert_eq!(frame.len(), FRAME_SIZE);
            assert_eq!(frame[0], FRAME_HEADER_CONTROL);
            assert_eq!(frame[1], protocol.id());
            assert_eq!(frame[2], 0x00);
            assert_eq!(frame[3], 0x00);
        }
    }

    #[test]
    fn test_control_frame_d8_neutral_golden_bytes() {
        // Regression fixture: D8 (id 3), all 16 channels at 1500us.
        // encode(1500) = 1024 = bit 10 set, repeating every 11 bits.
        let channels = ChannelSet::filled(1500);
        let frame = control_frame(ProtocolId::FrSkyD, &channels);

        let expected: [u8; 26] = [
            0x55, 0x03, 0x00, 0x00, // header
            0x00, 0x04, 0x20, 0x00, 0x01, 0x08, 0x40, 0x00, 0x02, 0x10, 0x80, // ch 0-7
            0x00, 0x04, 0x20, 0x00, 0x01, 0x08, 0x40, 0x00, 0x02, 0x10, 0x80, // ch 8-15
        ];
        assert_eq!(frame.as_slice(), expected);
    }

    #[test]
    fn test_control_frame_repacks_on_every_call() {
        let mut channels = ChannelSet::default();
        let before = control_frame(ProtocolId::FrSkyD, &channels);

        channels.set(0, 2000).unwrap();
        let after = control_frame(ProtocolId::FrSkyD, &channels);

        assert_ne!(before, after, "frame must reflect updated channel values");
    }

    #[test]
    fn test_bind_frame_sets_bind_flag() {
        let channels = ChannelSet::default();
        for protocol in ALL_PROTOCOLS {
            let control = control_frame(protocol, &channels);
            let bind = bind_frame(protocol, &channels);

            assert_eq!(bind[0], FRAME_HEADER_CONTROL);
            assert_eq!(
                bind[1],
                control[1] | BIND_FLAG,
                "bind id byte must be control id byte | 0x80 for {}",
                protocol
            );
            // Payload identical to the control frame's
            assert_eq!(bind[2..], control[2..]);
        }
    }

    #[test]
    fn test_priming_frame_bytes() {
        let frame = priming_frame();

        assert_eq!(frame.len(), FRAME_SIZE);
        assert_eq!(frame[0], FRAME_HEADER_CONTROL);
        assert_eq!(frame[1], PRIMING_PROTOCOL_ID);
        assert!(frame[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_failsafe_frame_bytes() {
        for protocol in ALL_PROTOCOLS {
            let frame = failsafe_frame(protocol);

            assert_eq!(frame.len(), FRAME_SIZE);
            assert_eq!(frame[0], FRAME_HEADER_FAILSAFE);
            assert_eq!(frame[1], protocol.id());
            assert!(frame[2..].iter().all(|&b| b == 0), "failsafe payload is zero-filled");
        }
    }
}
