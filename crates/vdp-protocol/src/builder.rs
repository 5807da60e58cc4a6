//! Fluent builder for constructing outbound [`Frame`]s.

use bytes::Bytes;
use vdp_core::constants::MAX_PAYLOAD_LEN;
use vdp_core::error::{Error, Result};
use vdp_core::types::{CommandCode, EcuId};

use crate::frame::Frame;

/// Builds a [`Frame`] field by field, validating the payload length before
/// the frame is handed to the codec for serialization.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    ecu_id: Option<EcuId>,
    command: Option<CommandCode>,
    data: Vec<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        FrameBuilder::default()
    }

    pub fn ecu_id(mut self, ecu_id: impl Into<EcuId>) -> Self {
        self.ecu_id = Some(ecu_id.into());
        self
    }

    pub fn command(mut self, command: CommandCode) -> Self {
        self.command = Some(command);
        self
    }

    pub fn data_byte(mut self, byte: u8) -> Self {
        self.data.push(byte);
        self
    }

    pub fn data(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.data = bytes.into();
        self
    }

    pub fn build(self) -> Result<Frame> {
        let ecu_id = self.ecu_id.ok_or(Error::MissingField("ecu_id"))?;
        let command = self.command.ok_or(Error::MissingField("command"))?;
        if self.data.len() > MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge(self.data.len()));
        }
        Ok(Frame::new(ecu_id, command, Bytes::from(self.data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_frame_with_fluent_chain() {
        let frame = FrameBuilder::new()
            .ecu_id(0x01)
            .command(CommandCode::ReadData)
            .data_byte(0xAB)
            .build()
            .unwrap();
        assert_eq!(frame.ecu_id.raw(), 0x01);
        assert_eq!(frame.command, CommandCode::ReadData);
        assert_eq!(&frame.data[..], &[0xAB]);
    }

    #[test]
    fn build_fails_without_command() {
        let result = FrameBuilder::new().ecu_id(0x01).build();
        assert!(result.is_err());
    }

    #[test]
    fn build_rejects_oversized_payload() {
        let result = FrameBuilder::new()
            .ecu_id(0x01)
            .command(CommandCode::WriteData)
            .data(vec![0u8; 248])
            .build();
        assert!(matches!(result, Err(Error::PayloadTooLarge(248))));
    }
}
