//! Declarative fixed-layout binary records.
//!
//! A [RecordType] is a static, ordered list of [FieldDescriptor]s. Each field is either a
//! primitive unsigned integer of one to eight bytes with its own [ByteOrder], or another
//! record type nested in place. A [Record] is an instance of a record type holding the
//! values of all primitive fields, nested ones included, in declaration order.
//!
//! ```rust
//! use smartfade::codec::{FieldDescriptor, PrimitiveLayout, Record, RecordType};
//! use smartfade::types::ByteOrder;
//!
//! static HEADER_FIELDS: [FieldDescriptor; 1] =
//!     [FieldDescriptor::primitive("counter", PrimitiveLayout::u16().little_endian())];
//! static HEADER: RecordType = RecordType::new("header", ByteOrder::BigEndian, &HEADER_FIELDS);
//!
//! static PACKET_FIELDS: [FieldDescriptor; 2] = [
//!     FieldDescriptor::nested("header", &HEADER),
//!     FieldDescriptor::primitive("value", PrimitiveLayout::u16()),
//! ];
//! static PACKET: RecordType = RecordType::new("packet", ByteOrder::BigEndian, &PACKET_FIELDS);
//!
//! let mut packet = Record::new(&PACKET).unwrap();
//! packet.set("header.counter", 0x0102).unwrap();
//! packet.set("value", 0x0304).unwrap();
//!
//! assert_eq!(packet.encode().as_slice(), &[0x02, 0x01, 0x03, 0x04]);
//! ```

use crate::consts::{MAX_RECORD_FIELDS, MAX_RECORD_SIZE};
use crate::types::ByteOrder;

/// Binary representation of an encoded record.
pub type RecordBuffer = heapless::Vec<u8, MAX_RECORD_SIZE>;

type FieldValues = heapless::Vec<u64, MAX_RECORD_FIELDS>;

const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// The buffer handed to decode does not have the size of the record.
    SizeMismatch { expected: usize, actual: usize },
    /// A field descriptor can't be encoded; contains the name of the field.
    UnknownFieldLayout(&'static str),
    /// The accessed field path does not exist in the record type.
    UnknownField,
    /// The value does not fit into the width of the field; contains the name of the field.
    ValueOverflow(&'static str),
    /// The record has more fields or bytes than the codec buffers can hold.
    RecordTooLarge,
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CodecError::SizeMismatch { expected, actual } => write!(
                f,
                "decode requires a buffer of {} byte(s), got {}",
                expected, actual
            ),
            CodecError::UnknownFieldLayout(field) => {
                write!(f, "field {} has an unknown layout", field)
            },
            CodecError::UnknownField => write!(f, "field does not exist"),
            CodecError::ValueOverflow(field) => {
                write!(f, "value does not fit into field {}", field)
            },
            CodecError::RecordTooLarge => write!(f, "record exceeds the codec buffer size"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}

/// Layout of a primitive unsigned integer field.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PrimitiveLayout {
    /// Width in bytes, between one and eight.
    pub width: usize,
    pub byte_order: ByteOrder,
    /// Value used when a record gets constructed.
    pub default: u64,
}

impl PrimitiveLayout {
    pub const fn new(width: usize) -> Self {
        Self {
            width,
            byte_order: ByteOrder::Inherit,
            default: 0,
        }
    }

    pub const fn u8() -> Self {
        Self::new(1)
    }

    pub const fn u16() -> Self {
        Self::new(2)
    }

    pub const fn u32() -> Self {
        Self::new(4)
    }

    pub const fn u64() -> Self {
        Self::new(8)
    }

    pub const fn little_endian(self) -> Self {
        self.with_byte_order(ByteOrder::LittleEndian)
    }

    pub const fn big_endian(self) -> Self {
        self.with_byte_order(ByteOrder::BigEndian)
    }

    pub const fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub const fn with_default(mut self, default: u64) -> Self {
        self.default = default;
        self
    }

    fn fits(&self, value: u64) -> bool {
        self.width >= 8 || value >> (self.width * 8) == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldLayout {
    Primitive(PrimitiveLayout),
    Nested(&'static RecordType),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub layout: FieldLayout,
}

impl FieldDescriptor {
    pub const fn primitive(name: &'static str, layout: PrimitiveLayout) -> Self {
        Self {
            name,
            layout: FieldLayout::Primitive(layout),
        }
    }

    pub const fn nested(name: &'static str, record_type: &'static RecordType) -> Self {
        Self {
            name,
            layout: FieldLayout::Nested(record_type),
        }
    }
}

/// An ordered set of fields describing a fixed-size binary record.
#[derive(Debug)]
pub struct RecordType {
    pub name: &'static str,
    /// Byte order for primitive fields that don't declare their own.
    pub byte_order: ByteOrder,
    pub fields: &'static [FieldDescriptor],
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl RecordType {
    pub const fn new(
        name: &'static str,
        byte_order: ByteOrder,
        fields: &'static [FieldDescriptor],
    ) -> Self {
        Self {
            name,
            byte_order,
            fields,
        }
    }

    /// Size of an encoded record in bytes.
    pub fn size(&self) -> usize {
        self.fields
            .iter()
            .map(|field| match field.layout {
                FieldLayout::Primitive(layout) => layout.width,
                FieldLayout::Nested(nested) => nested.size(),
            })
            .sum()
    }

    /// Amount of primitive fields including the ones of nested records.
    pub fn primitive_count(&self) -> usize {
        self.fields
            .iter()
            .map(|field| match field.layout {
                FieldLayout::Primitive(_) => 1,
                FieldLayout::Nested(nested) => nested.primitive_count(),
            })
            .sum()
    }

    /// Checks every descriptor of this record and its nested records.
    pub fn validate(&self) -> Result<(), CodecError> {
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.is_empty()
                || field.name.contains(PATH_SEPARATOR)
                || self.fields[..index]
                    .iter()
                    .any(|previous| previous.name == field.name)
            {
                return Err(CodecError::UnknownFieldLayout(field.name));
            }

            match field.layout {
                FieldLayout::Primitive(layout) => {
                    if !(1..=8).contains(&layout.width) || !layout.fits(layout.default) {
                        return Err(CodecError::UnknownFieldLayout(field.name));
                    }
                },
                FieldLayout::Nested(nested) => nested.validate()?,
            }
        }

        if self.size() > MAX_RECORD_SIZE || self.primitive_count() > MAX_RECORD_FIELDS {
            return Err(CodecError::RecordTooLarge);
        }

        Ok(())
    }

    /// Finds the primitive field addressed by a dot separated path.
    /// Returns the position of the field in the value list and its layout.
    fn locate(&self, path: &str) -> Option<(usize, &'static str, PrimitiveLayout)> {
        let (head, tail) = match path.split_once(PATH_SEPARATOR) {
            Some((head, tail)) => (head, Some(tail)),
            None => (path, None),
        };

        let mut position = 0;
        for field in self.fields {
            if field.name != head {
                position += match field.layout {
                    FieldLayout::Primitive(_) => 1,
                    FieldLayout::Nested(nested) => nested.primitive_count(),
                };
                continue;
            }

            return match (field.layout, tail) {
                (FieldLayout::Primitive(layout), None) => Some((position, field.name, layout)),
                (FieldLayout::Nested(nested), Some(tail)) => nested
                    .locate(tail)
                    .map(|(offset, name, layout)| (position + offset, name, layout)),
                _ => None,
            };
        }

        None
    }

    fn push_defaults(&self, values: &mut FieldValues) -> Result<(), CodecError> {
        for field in self.fields {
            match field.layout {
                FieldLayout::Primitive(layout) => values
                    .push(layout.default)
                    .map_err(|_| CodecError::RecordTooLarge)?,
                FieldLayout::Nested(nested) => nested.push_defaults(values)?,
            }
        }

        Ok(())
    }

    fn encode_values(&self, values: &[u64], dst: &mut RecordBuffer) -> usize {
        let mut consumed = 0;

        for field in self.fields {
            match field.layout {
                FieldLayout::Primitive(layout) => {
                    let byte_order = layout.byte_order.resolve(self.byte_order);
                    write_primitive(values[consumed], layout.width, byte_order, dst);
                    consumed += 1;
                },
                FieldLayout::Nested(nested) => {
                    consumed += nested.encode_values(&values[consumed..], dst);
                },
            }
        }

        consumed
    }

    fn decode_values(&self, buffer: &[u8], values: &mut [u64]) -> usize {
        let mut consumed = 0;
        let mut offset = 0;

        for field in self.fields {
            match field.layout {
                FieldLayout::Primitive(layout) => {
                    let byte_order = layout.byte_order.resolve(self.byte_order);
                    values[consumed] =
                        read_primitive(&buffer[offset..offset + layout.width], byte_order);
                    consumed += 1;
                    offset += layout.width;
                },
                FieldLayout::Nested(nested) => {
                    let size = nested.size();
                    consumed += nested
                        .decode_values(&buffer[offset..offset + size], &mut values[consumed..]);
                    offset += size;
                },
            }
        }

        consumed
    }
}

fn write_primitive(value: u64, width: usize, byte_order: ByteOrder, dst: &mut RecordBuffer) {
    let bytes = value.to_le_bytes();

    // Capacity is checked by RecordType::validate before any record exists.
    match byte_order {
        ByteOrder::LittleEndian => {
            let _ = dst.extend_from_slice(&bytes[..width]);
        },
        _ => {
            for byte in bytes[..width].iter().rev() {
                let _ = dst.push(*byte);
            }
        },
    }
}

fn read_primitive(src: &[u8], byte_order: ByteOrder) -> u64 {
    match byte_order {
        ByteOrder::LittleEndian => src
            .iter()
            .rev()
            .fold(0u64, |value, byte| (value << 8) | *byte as u64),
        _ => src
            .iter()
            .fold(0u64, |value, byte| (value << 8) | *byte as u64),
    }
}

/// An instance of a [RecordType] with concrete field values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    record_type: &'static RecordType,
    values: FieldValues,
}

impl Record {
    /// Creates a record with every field set to its default value.
    pub fn new(record_type: &'static RecordType) -> Result<Self, CodecError> {
        record_type.validate()?;

        let mut values = FieldValues::new();
        record_type.push_defaults(&mut values)?;

        Ok(Self {
            record_type,
            values,
        })
    }

    pub fn record_type(&self) -> &'static RecordType {
        self.record_type
    }

    pub fn size(&self) -> usize {
        self.record_type.size()
    }

    /// Reads a primitive field. Fields of nested records are addressed as `outer.inner`.
    pub fn get(&self, path: &str) -> Result<u64, CodecError> {
        let (position, _, _) = self
            .record_type
            .locate(path)
            .ok_or(CodecError::UnknownField)?;

        Ok(self.values[position])
    }

    /// Writes a primitive field. Fields of nested records are addressed as `outer.inner`.
    pub fn set(&mut self, path: &str, value: u64) -> Result<(), CodecError> {
        let (position, name, layout) = self
            .record_type
            .locate(path)
            .ok_or(CodecError::UnknownField)?;

        if !layout.fits(value) {
            return Err(CodecError::ValueOverflow(name));
        }

        self.values[position] = value;
        Ok(())
    }

    /// Builder style variant of [Record::set].
    pub fn with(mut self, path: &str, value: u64) -> Result<Self, CodecError> {
        self.set(path, value)?;
        Ok(self)
    }

    /// Serializes all fields in declaration order.
    pub fn encode(&self) -> RecordBuffer {
        let mut buffer = RecordBuffer::new();
        self.record_type.encode_values(&self.values, &mut buffer);

        buffer
    }

    /// Overwrites all field values with the ones decoded from the buffer.
    /// The buffer has to have exactly the size of the record.
    pub fn decode(&mut self, buffer: &[u8]) -> Result<(), CodecError> {
        let expected = self.size();
        if buffer.len() != expected {
            return Err(CodecError::SizeMismatch {
                expected,
                actual: buffer.len(),
            });
        }

        self.record_type.decode_values(buffer, &mut self.values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static INNER_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor::primitive("counter", PrimitiveLayout::u16().little_endian()),
        FieldDescriptor::primitive("flags", PrimitiveLayout::u8().with_default(0x5A)),
    ];
    static INNER: RecordType = RecordType::new("inner", ByteOrder::BigEndian, &INNER_FIELDS);

    static OUTER_FIELDS: [FieldDescriptor; 4] = [
        FieldDescriptor::nested("inner", &INNER),
        FieldDescriptor::primitive("word", PrimitiveLayout::u32()),
        FieldDescriptor::primitive("wide", PrimitiveLayout::new(3).little_endian()),
        FieldDescriptor::primitive("long", PrimitiveLayout::u64()),
    ];
    static OUTER: RecordType = RecordType::new("outer", ByteOrder::Inherit, &OUTER_FIELDS);

    static LITTLE_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor::primitive("a", PrimitiveLayout::u16()),
        FieldDescriptor::primitive("b", PrimitiveLayout::u16().big_endian()),
    ];
    static LITTLE: RecordType = RecordType::new("little", ByteOrder::LittleEndian, &LITTLE_FIELDS);

    static DUPLICATE_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor::primitive("a", PrimitiveLayout::u8()),
        FieldDescriptor::primitive("a", PrimitiveLayout::u8()),
    ];
    static DUPLICATE: RecordType =
        RecordType::new("duplicate", ByteOrder::BigEndian, &DUPLICATE_FIELDS);

    static ZERO_WIDTH_FIELDS: [FieldDescriptor; 1] =
        [FieldDescriptor::primitive("a", PrimitiveLayout::new(0))];
    static ZERO_WIDTH: RecordType =
        RecordType::new("zero_width", ByteOrder::BigEndian, &ZERO_WIDTH_FIELDS);

    static BAD_DEFAULT_FIELDS: [FieldDescriptor; 1] =
        [FieldDescriptor::primitive("a", PrimitiveLayout::u8().with_default(0x100))];
    static BAD_DEFAULT: RecordType =
        RecordType::new("bad_default", ByteOrder::BigEndian, &BAD_DEFAULT_FIELDS);

    #[test]
    fn test_size_includes_nested_records() {
        assert_eq!(INNER.size(), 3);
        assert_eq!(OUTER.size(), 3 + 4 + 3 + 8);
        assert_eq!(OUTER.primitive_count(), 5);
    }

    #[test]
    fn test_defaults() {
        let record = Record::new(&OUTER).unwrap();

        assert_eq!(record.get("inner.counter").unwrap(), 0);
        assert_eq!(record.get("inner.flags").unwrap(), 0x5A);
        assert_eq!(record.get("word").unwrap(), 0);
    }

    #[test]
    fn test_encode_mixed_byte_order() {
        let record = Record::new(&OUTER)
            .unwrap()
            .with("inner.counter", 0x1234)
            .unwrap()
            .with("inner.flags", 0xAB)
            .unwrap()
            .with("word", 0x0102_0304)
            .unwrap()
            .with("wide", 0x0A0B0C)
            .unwrap()
            .with("long", 0x1122_3344_5566_7788)
            .unwrap();

        assert_eq!(
            record.encode().as_slice(),
            &[
                0x34, 0x12, 0xAB, // inner
                0x01, 0x02, 0x03, 0x04, // word, inherits big-endian
                0x0C, 0x0B, 0x0A, // wide
                0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, // long
            ]
        );
    }

    #[test]
    fn test_record_level_byte_order() {
        let record = Record::new(&LITTLE)
            .unwrap()
            .with("a", 0x0102)
            .unwrap()
            .with("b", 0x0304)
            .unwrap();

        assert_eq!(record.encode().as_slice(), &[0x02, 0x01, 0x03, 0x04]);
    }

    #[test]
    fn test_decode_into_fresh_record() {
        let mut source = Record::new(&OUTER).unwrap();
        source.set("inner.counter", 0xFFFE).unwrap();
        source.set("inner.flags", 0x01).unwrap();
        source.set("word", 0xDEAD_BEEF).unwrap();
        source.set("wide", 0xFF_FFFF).unwrap();
        source.set("long", u64::MAX).unwrap();

        let mut decoded = Record::new(&OUTER).unwrap();
        decoded.decode(&source.encode()).unwrap();

        assert_eq!(decoded, source);
    }

    #[test]
    fn test_decode_overwrites_previous_values() {
        let mut record = Record::new(&LITTLE).unwrap();
        record.set("a", 0xFFFF).unwrap();
        record.decode(&[0x00, 0x00, 0x12, 0x34]).unwrap();

        assert_eq!(record.get("a").unwrap(), 0);
        assert_eq!(record.get("b").unwrap(), 0x1234);
    }

    #[test]
    fn test_decode_size_mismatch() {
        let mut record = Record::new(&LITTLE).unwrap();

        assert_eq!(
            record.decode(&[0x00, 0x00, 0x00]).unwrap_err(),
            CodecError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(
            record.decode(&[0x00; 5]).unwrap_err(),
            CodecError::SizeMismatch {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn test_malformed_descriptors() {
        assert_eq!(
            Record::new(&DUPLICATE).unwrap_err(),
            CodecError::UnknownFieldLayout("a")
        );
        assert_eq!(
            Record::new(&ZERO_WIDTH).unwrap_err(),
            CodecError::UnknownFieldLayout("a")
        );
        assert_eq!(
            Record::new(&BAD_DEFAULT).unwrap_err(),
            CodecError::UnknownFieldLayout("a")
        );
    }

    #[test]
    fn test_field_access_errors() {
        let mut record = Record::new(&OUTER).unwrap();

        assert_eq!(record.get("missing").unwrap_err(), CodecError::UnknownField);
        assert_eq!(record.get("inner").unwrap_err(), CodecError::UnknownField);
        assert_eq!(record.get("word.sub").unwrap_err(), CodecError::UnknownField);
        assert_eq!(
            record.set("inner.flags", 0x100).unwrap_err(),
            CodecError::ValueOverflow("flags")
        );
        assert_eq!(
            record.set("wide", 0x100_0000).unwrap_err(),
            CodecError::ValueOverflow("wide")
        );
    }
}
