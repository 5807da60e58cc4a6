//! Wire-format constants for the Vehicle Diagnostic Protocol.
//!
//! These values are byte-exact and interoperability depends on them; they
//! are not configurable.

use std::time::Duration;

/// Frame start sentinel. Not escaped in payload.
///
/// ```
/// assert_eq!(vdp_core::constants::START_BYTE, 0x7E);
/// ```
pub const START_BYTE: u8 = 0x7E;

/// Frame end sentinel. Not escaped in payload.
///
/// ```
/// assert_eq!(vdp_core::constants::END_BYTE, 0x7F);
/// ```
pub const END_BYTE: u8 = 0x7F;

/// Minimum valid `LEN` field: start + len + ecu_id + cmd + checksum + end,
/// zero data bytes.
pub const MIN_FRAME_LEN: u8 = 6;

/// Maximum valid `LEN` field (imposed by the 8-bit length field and the
/// 247-byte payload cap).
pub const MAX_FRAME_LEN: u8 = 253;

/// Maximum payload (`data`) length in bytes.
///
/// ```
/// assert_eq!(vdp_core::constants::MAX_PAYLOAD_LEN, 247);
/// ```
pub const MAX_PAYLOAD_LEN: usize = 247;

/// High bit of `ecu_id` marking a response frame.
pub const RESPONSE_BIT: u8 = 0x80;

/// Reserved ECU id for keep-alive frames.
pub const KEEPALIVE_ECU_ID: u8 = 0x00;

/// Default cap on the streaming parser's internal buffer, expressed as a
/// multiple of [`MAX_FRAME_LEN`]. Bounds memory use against a noisy or
/// adversarial stream that never produces a classifiable frame.
pub const DEFAULT_MAX_BUFFER_FRAMES: usize = 64;

/// Default request timeout used by [`crate::types`] callers that do not
/// specify one explicitly.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Upper bound on simultaneously outstanding transactions, independent of
/// the 256-slot sequence space. A lower soft cap protects against a single
/// misbehaving peer exhausting the sequence space.
pub const DEFAULT_MAX_PENDING: usize = 64;
