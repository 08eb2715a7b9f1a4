/// Vendor id shared by every SmartFade model.
pub const SMARTFADE_VENDOR_ID: u16 = 0x14D5;

/// Host to device bulk endpoint (EP4 OUT).
pub const ENDPOINT_OUT: u8 = 0x04;
/// Device to host bulk endpoint (EP3 IN).
pub const ENDPOINT_IN: u8 = 0x83;
/// Interface class of the vendor data interface.
pub const DATA_INTERFACE_CLASS: u8 = 0xFF;

pub const ENVELOPE_SIZE: usize = 12;
pub const SEQUENCE_HEADER_SIZE: usize = 2;
pub const CONTROL_COMMAND_SIZE: usize = 7;

/// Button, fader and bump control.
pub const OP_CONTROL: u8 = 0x14;
/// Info and erase family. Payload layout is not known.
pub const OP_INFO: u8 = 0x27;

pub const LEVEL_MAX: u16 = 0xFF;
pub const STATE_ON: u8 = 0xFF;
pub const STATE_OFF: u8 = 0x00;

/// Name of the button held while pulsing a bump to select a memory page.
pub const MEMORIES_BUTTON: &str = "memories";

/// Largest encoded record the codec will build.
pub const MAX_RECORD_SIZE: usize = 64;
/// Maximum amount of primitive fields in a record, nested records included.
pub const MAX_RECORD_FIELDS: usize = 16;
/// Largest event payload accepted while draining the device queue.
pub const MAX_EVENT_PAYLOAD_SIZE: usize = 1024;
