//! Record types of the SmartFade USB protocol.
//!
//! Every transaction starts with a 12 byte [ENVELOPE] that announces the kind of the
//! transaction and the size of the payload frame that follows. Payload frames that need
//! sequencing nest the [SEQUENCE_HEADER] as their first field.

use crate::codec::{CodecError, FieldDescriptor, PrimitiveLayout, Record, RecordType};
use crate::consts::OP_CONTROL;
use crate::types::{ByteOrder, CommandKind};

pub const COMMAND_KIND: &str = "command_kind";
pub const PAYLOAD_SIZE: &str = "payload_size";
/// Path of the sequence number inside any sequenced payload record.
pub const SEQUENCE_NUMBER: &str = "send_header.sequence_number";
pub const OPCODE: &str = "opcode";
pub const INDEX: &str = "index";
pub const STATE: &str = "state";

static ENVELOPE_FIELDS: [FieldDescriptor; 4] = [
    FieldDescriptor::primitive(COMMAND_KIND, PrimitiveLayout::u8()),
    FieldDescriptor::primitive("reserved", PrimitiveLayout::u8()),
    FieldDescriptor::primitive(PAYLOAD_SIZE, PrimitiveLayout::u16().little_endian()),
    FieldDescriptor::primitive("padding", PrimitiveLayout::u64()),
];

/// `command_kind: u8, reserved: u8, payload_size: u16 (LE), padding: u64`
pub static ENVELOPE: RecordType =
    RecordType::new("envelope", ByteOrder::BigEndian, &ENVELOPE_FIELDS);

static SEQUENCE_HEADER_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::primitive(
    "sequence_number",
    PrimitiveLayout::u16().little_endian(),
)];

/// `sequence_number: u16 (LE)`
pub static SEQUENCE_HEADER: RecordType =
    RecordType::new("sequence_header", ByteOrder::BigEndian, &SEQUENCE_HEADER_FIELDS);

static CONTROL_COMMAND_FIELDS: [FieldDescriptor; 5] = [
    FieldDescriptor::nested("send_header", &SEQUENCE_HEADER),
    FieldDescriptor::primitive("reserved", PrimitiveLayout::u8()),
    FieldDescriptor::primitive(OPCODE, PrimitiveLayout::u8()),
    FieldDescriptor::primitive(INDEX, PrimitiveLayout::u16()),
    FieldDescriptor::primitive(STATE, PrimitiveLayout::u8()),
];

/// `send_header, reserved: u8, opcode: u8, index: u16, state: u8`
///
/// With opcode `0x14` the index addresses a button, fader or bump and the state is
/// either the level or the pushed state.
pub static CONTROL_COMMAND: RecordType =
    RecordType::new("control_command", ByteOrder::BigEndian, &CONTROL_COMMAND_FIELDS);

/// Builds an envelope announcing a payload of `payload_size` bytes.
pub fn envelope(kind: CommandKind, payload_size: u16) -> Result<Record, CodecError> {
    Record::new(&ENVELOPE)?
        .with(COMMAND_KIND, kind as u64)?
        .with(PAYLOAD_SIZE, payload_size as u64)
}

/// Builds a control command with opcode `0x14`. The sequence number is left at zero,
/// the dispatcher assigns it on send.
pub fn control_command(index: u16, state: u8) -> Result<Record, CodecError> {
    Record::new(&CONTROL_COMMAND)?
        .with(OPCODE, OP_CONTROL as u64)?
        .with(INDEX, index as u64)?
        .with(STATE, state as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CONTROL_COMMAND_SIZE, ENVELOPE_SIZE, SEQUENCE_HEADER_SIZE};

    #[test]
    fn test_frame_sizes() {
        assert_eq!(ENVELOPE.size(), ENVELOPE_SIZE);
        assert_eq!(SEQUENCE_HEADER.size(), SEQUENCE_HEADER_SIZE);
        assert_eq!(CONTROL_COMMAND.size(), CONTROL_COMMAND_SIZE);
    }

    #[test]
    fn test_envelope_layout() {
        let envelope = envelope(CommandKind::Send, 0x0107).unwrap();

        assert_eq!(
            envelope.encode().as_slice(),
            &[0x01, 0x00, 0x07, 0x01, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_control_command_layout() {
        let mut command = control_command(0x0139, 0xFF).unwrap();
        command.set(SEQUENCE_NUMBER, 0x0203).unwrap();

        assert_eq!(
            command.encode().as_slice(),
            &[0x03, 0x02, 0x00, 0x14, 0x01, 0x39, 0xFF]
        );
    }

    #[test]
    fn test_decode_device_envelope() {
        let mut response = Record::new(&ENVELOPE).unwrap();
        response
            .decode(&[0x00, 0x00, 0x10, 0x00, 0, 0, 0, 0, 0, 0, 0, 0])
            .unwrap();

        assert_eq!(response.get(COMMAND_KIND).unwrap(), CommandKind::Poll as u64);
        assert_eq!(response.get(PAYLOAD_SIZE).unwrap(), 0x10);
    }

    #[test]
    fn test_control_command_decode() {
        let mut command = Record::new(&CONTROL_COMMAND).unwrap();
        command
            .decode(&[0xFF, 0xFF, 0x00, 0x14, 0x01, 0x17, 0x80])
            .unwrap();

        assert_eq!(command.get(SEQUENCE_NUMBER).unwrap(), 0xFFFF);
        assert_eq!(command.get(OPCODE).unwrap(), 0x14);
        assert_eq!(command.get(INDEX).unwrap(), 0x0117);
        assert_eq!(command.get(STATE).unwrap(), 0x80);
    }
}
