//! Frame codec (component A): pure serialize/verify functions over the VDP
//! wire format.
//!
//! `START(0x7E) | LEN | ECU_ID | CMD | DATA[0..n] | CHECKSUM | END(0x7F)`

use bytes::Bytes;
use vdp_core::constants::{END_BYTE, MAX_FRAME_LEN, MAX_PAYLOAD_LEN, MIN_FRAME_LEN, START_BYTE};
use vdp_core::error::Error;
use vdp_core::types::{CommandCode, EcuId};

/// A logical, already-decoded frame: the payload application code actually
/// wants to look at, independent of wire framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub ecu_id: EcuId,
    pub command: CommandCode,
    pub data: Bytes,
}

impl Frame {
    pub fn new(ecu_id: EcuId, command: CommandCode, data: impl Into<Bytes>) -> Self {
        Frame {
            ecu_id,
            command,
            data: data.into(),
        }
    }

    /// Serialize to the `n + 6` byte wire form.
    ///
    /// ```
    /// use vdp_protocol::frame::Frame;
    /// use vdp_core::types::{CommandCode, EcuId};
    ///
    /// let frame = Frame::new(EcuId::new(0x01).as_response(), CommandCode::ReadData, &b""[..]);
    /// let wire = frame.serialize().unwrap();
    /// assert_eq!(&wire[..], &[0x7E, 0x06, 0x81, 0x10, 0x97, 0x7F]);
    /// ```
    pub fn serialize(&self) -> Result<Bytes, Error> {
        if self.data.len() > MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge(self.data.len()));
        }
        let len = (self.data.len() + 6) as u8;
        let mut out = Vec::with_capacity(len as usize);
        out.push(START_BYTE);
        out.push(len);
        out.push(self.ecu_id.raw());
        out.push(self.command.to_u8());
        out.extend_from_slice(&self.data);
        let checksum = checksum_over(&out[1..]);
        out.push(checksum);
        out.push(END_BYTE);
        Ok(Bytes::from(out))
    }
}

/// XOR of every byte in `bytes`. Used over `window[1..=data_end]`, i.e.
/// `LEN` through the last `DATA` byte inclusive.
fn checksum_over(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Verify a byte window presumed to be one complete frame of declared
/// length `window[1]`. Returns the decoded logical frame on success.
///
/// Pure: allocates only the output frame's data, does not touch any shared
/// state.
pub fn verify(window: &[u8]) -> Result<Frame, Error> {
    let declared_len = *window.get(1).ok_or(Error::Truncated)?;
    if window.len() != declared_len as usize || !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&declared_len) {
        return Err(Error::BadLength(declared_len));
    }
    debug_assert_eq!(window[0], START_BYTE, "caller must ensure window starts with START_BYTE");

    let l = declared_len as usize;
    if window[l - 1] != END_BYTE {
        return Err(Error::BadEnd);
    }

    let computed = checksum_over(&window[1..l - 2]);
    let carried = window[l - 2];
    if computed != carried {
        return Err(Error::BadChecksum { computed, carried });
    }

    let ecu_id = EcuId::new(window[2]);
    let command = CommandCode::from_u8(window[3]);
    let data = Bytes::copy_from_slice(&window[4..l - 2]);

    Ok(Frame { ecu_id, command, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn serialize_empty_payload() {
        let frame = Frame::new(EcuId::new(0x81), CommandCode::ReadData, &b""[..]);
        let wire = frame.serialize().unwrap();
        assert_eq!(&wire[..], &[0x7E, 0x06, 0x81, 0x10, 0x97, 0x7F]);
    }

    #[test]
    fn serialize_rejects_oversized_payload() {
        let data = vec![0u8; 248];
        let frame = Frame::new(EcuId::new(0x01), CommandCode::WriteData, data);
        assert!(matches!(frame.serialize(), Err(Error::PayloadTooLarge(248))));
    }

    #[test]
    fn verify_accepts_s1() {
        let wire = [0x7E, 0x06, 0x81, 0x10, 0x97, 0x7F];
        let frame = verify(&wire).unwrap();
        assert_eq!(frame.ecu_id, EcuId::new(0x81));
        assert_eq!(frame.command, CommandCode::ReadData);
        assert!(frame.data.is_empty());
    }

    #[test]
    fn verify_accepts_s2_with_payload() {
        let wire = [0x7E, 0x09, 0x82, 0x20, 0x12, 0x34, 0x56, 0xA6, 0x7F];
        let frame = verify(&wire).unwrap();
        assert_eq!(frame.ecu_id, EcuId::new(0x82));
        assert_eq!(frame.command, CommandCode::WriteData);
        assert_eq!(&frame.data[..], &[0x12, 0x34, 0x56]);
    }

    #[rstest]
    #[case(5)]
    #[case(254)]
    fn verify_rejects_out_of_range_length(#[case] bad_len: u8) {
        let wire = vec![0x7E, bad_len, 0x01, 0x10, 0x00, 0x7F];
        let result = verify(&wire);
        assert!(matches!(result, Err(Error::BadLength(_))));
    }

    #[test]
    fn verify_rejects_bad_end() {
        let wire = [0x7E, 0x06, 0x81, 0x10, 0x97, 0x7D];
        assert!(matches!(verify(&wire), Err(Error::BadEnd)));
    }

    #[test]
    fn verify_rejects_bad_checksum() {
        let wire = [0x7E, 0x06, 0x81, 0x10, 0x97 ^ 0xFF, 0x7F];
        assert!(matches!(verify(&wire), Err(Error::BadChecksum { .. })));
    }

    #[test]
    fn round_trip_preserves_payload() {
        let frame = Frame::new(EcuId::new(0x02).as_response(), CommandCode::ReadData, &b"abc"[..]);
        let wire = frame.serialize().unwrap();
        let decoded = verify(&wire).unwrap();
        assert_eq!(decoded, frame);
    }

    proptest::proptest! {
        #[test]
        fn round_trip_holds_for_arbitrary_payloads(
            ecu in 0u8..=255,
            cmd in 0u8..=255,
            data in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..=247),
        ) {
            let frame = Frame::new(EcuId::new(ecu), CommandCode::from_u8(cmd), data);
            let wire = frame.serialize().unwrap();
            let decoded = verify(&wire).unwrap();
            proptest::prop_assert_eq!(decoded, frame);
        }
    }
}
