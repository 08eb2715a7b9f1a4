/// Kind of transaction announced by an envelope frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandKind {
    /// Ask the device for its next queued event.
    Poll = 0x00,
    /// A payload frame follows.
    Send = 0x01,
    /// Detailed status request. Only observed, never decoded.
    Status = 0x02,
}

impl TryFrom<u8> for CommandKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        Ok(match value {
            0x00 => Self::Poll,
            0x01 => Self::Send,
            0x02 => Self::Status,
            _ => {
                return Err(());
            },
        })
    }
}

/// Byte order of a primitive field.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOrder {
    /// Most significant byte first.
    BigEndian,
    /// Least significant byte first.
    LittleEndian,
    /// Use the byte order of the enclosing record. A record that inherits
    /// itself falls back to big-endian.
    #[default]
    Inherit,
}

impl ByteOrder {
    /// Resolves `Inherit` against the given outer byte order.
    pub const fn resolve(self, outer: ByteOrder) -> ByteOrder {
        match self {
            ByteOrder::Inherit => match outer {
                ByteOrder::LittleEndian => ByteOrder::LittleEndian,
                _ => ByteOrder::BigEndian,
            },
            order => order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_kind_from_u8() {
        assert_eq!(CommandKind::try_from(0).unwrap(), CommandKind::Poll);
        assert_eq!(CommandKind::try_from(1).unwrap(), CommandKind::Send);
        assert_eq!(CommandKind::try_from(2).unwrap(), CommandKind::Status);
        CommandKind::try_from(3).unwrap_err();
    }

    #[test]
    fn test_byte_order_resolution() {
        use ByteOrder::*;

        assert_eq!(Inherit.resolve(Inherit), BigEndian);
        assert_eq!(Inherit.resolve(BigEndian), BigEndian);
        assert_eq!(Inherit.resolve(LittleEndian), LittleEndian);
        assert_eq!(LittleEndian.resolve(BigEndian), LittleEndian);
        assert_eq!(BigEndian.resolve(LittleEndian), BigEndian);
    }
}
