use std::fmt;

use crate::constants::{KEEPALIVE_ECU_ID, RESPONSE_BIT};

/// An 8-bit ECU address, with the high bit reinterpreted as the
/// "this is a response" marker rather than part of the address space.
///
/// ```
/// use vdp_core::types::EcuId;
///
/// let request = EcuId::new(0x01);
/// assert!(!request.is_response());
///
/// let response = request.as_response();
/// assert!(response.is_response());
/// assert_eq!(response.strip_response(), request);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EcuId(u8);

impl EcuId {
    /// Reserved address for keep-alive frames.
    pub const KEEPALIVE: EcuId = EcuId(KEEPALIVE_ECU_ID);

    pub const fn new(raw: u8) -> Self {
        EcuId(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn is_response(self) -> bool {
        self.0 & RESPONSE_BIT != 0
    }

    pub const fn is_keepalive(self) -> bool {
        self.0 == KEEPALIVE_ECU_ID
    }

    /// Set the response bit, producing the id an ECU uses when answering.
    pub const fn as_response(self) -> Self {
        EcuId(self.0 | RESPONSE_BIT)
    }

    /// Clear the response bit, recovering the request-side address.
    pub const fn strip_response(self) -> Self {
        EcuId(self.0 & !RESPONSE_BIT)
    }
}

impl fmt::Display for EcuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

impl From<u8> for EcuId {
    fn from(raw: u8) -> Self {
        EcuId(raw)
    }
}

/// Command codes carried in a frame's `CMD` byte.
///
/// `Acknowledge` and `NegativeAck` are control codes routed by sequence
/// number (see the transaction table); the rest are data commands routed
/// by `(ecu_id, command)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    ReadData,
    WriteData,
    ClearCodes,
    EcuReset,
    KeepAlive,
    Acknowledge,
    NegativeAck,
    /// Any byte outside the known set. The engine NAKs these on intake.
    Unknown(u8),
}

impl CommandCode {
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            0x10 => CommandCode::ReadData,
            0x20 => CommandCode::WriteData,
            0x30 => CommandCode::ClearCodes,
            0x40 => CommandCode::EcuReset,
            0x50 => CommandCode::KeepAlive,
            0x06 => CommandCode::Acknowledge,
            0x15 => CommandCode::NegativeAck,
            other => CommandCode::Unknown(other),
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            CommandCode::ReadData => 0x10,
            CommandCode::WriteData => 0x20,
            CommandCode::ClearCodes => 0x30,
            CommandCode::EcuReset => 0x40,
            CommandCode::KeepAlive => 0x50,
            CommandCode::Acknowledge => 0x06,
            CommandCode::NegativeAck => 0x15,
            CommandCode::Unknown(raw) => raw,
        }
    }

    /// True for the two control codes, which are routed by sequence number
    /// (carried in `data[0]`) rather than by `(ecu_id, command)`.
    pub const fn is_control(self) -> bool {
        matches!(self, CommandCode::Acknowledge | CommandCode::NegativeAck)
    }

    pub const fn is_unknown(self) -> bool {
        matches!(self, CommandCode::Unknown(_))
    }
}

/// Status byte taxonomy carried in `data[0]` of a response frame.
///
/// `Timeout` is never observed on the wire; it is synthesized by the
/// transaction table sweep. `InvalidStatus` (`0x80`) is the one value the
/// engine treats specially on intake: it emits a NAK to the peer instead of
/// routing the frame. `0x00` is plain `Success`, not a second invalid
/// marker — earlier designs that NAK on `0x00` were treating the defined
/// success code as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    Success,
    InvalidCommand,
    InvalidData,
    EcuBusy,
    /// Synthesized locally by the transaction table; never sent on the wire.
    Timeout,
    GeneralError,
    InvalidStatus,
    Other(u8),
}

impl ResponseStatus {
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            0x00 => ResponseStatus::Success,
            0x01 => ResponseStatus::InvalidCommand,
            0x02 => ResponseStatus::InvalidData,
            0x03 => ResponseStatus::EcuBusy,
            0xFE => ResponseStatus::Timeout,
            0xFF => ResponseStatus::GeneralError,
            0x80 => ResponseStatus::InvalidStatus,
            other => ResponseStatus::Other(other),
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            ResponseStatus::Success => 0x00,
            ResponseStatus::InvalidCommand => 0x01,
            ResponseStatus::InvalidData => 0x02,
            ResponseStatus::EcuBusy => 0x03,
            ResponseStatus::Timeout => 0xFE,
            ResponseStatus::GeneralError => 0xFF,
            ResponseStatus::InvalidStatus => 0x80,
            ResponseStatus::Other(raw) => raw,
        }
    }
}

/// 8-bit monotonically incrementing transaction sequence number, wrapping
/// modulo 256.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeqNo(pub u8);

impl SeqNo {
    pub const fn wrapping_next(self) -> Self {
        SeqNo(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SeqNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
