use std::collections::VecDeque;
use std::vec::Vec;

use crate::codec::Record;
use crate::frames::{CONTROL_COMMAND, ENVELOPE, INDEX, PAYLOAD_SIZE, SEQUENCE_NUMBER, STATE};
use crate::transport::{Transport, TransportRead, TransportWrite};

#[derive(Debug, Eq, PartialEq)]
pub struct MockError;

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mock transport failure")
    }
}

/// Records every write and answers reads from a scripted queue.
#[derive(Default)]
pub struct MockTransport {
    pub writes: Vec<Vec<u8>>,
    pub reads: VecDeque<Vec<u8>>,
    /// Fail the write with this position in `writes`.
    pub fail_write_at: Option<usize>,
}

impl MockTransport {
    pub fn with_reads(reads: &[&[u8]]) -> Self {
        Self {
            reads: reads.iter().map(|read| read.to_vec()).collect(),
            ..Default::default()
        }
    }

    /// Decodes the writes as envelope and control command pairs.
    /// Returns `(sequence_number, index, state)` per command.
    pub fn control_commands(&self) -> Vec<(u16, u16, u8)> {
        self.writes
            .chunks(2)
            .map(|pair| {
                let mut envelope = Record::new(&ENVELOPE).unwrap();
                envelope.decode(&pair[0]).unwrap();
                assert_eq!(envelope.get(PAYLOAD_SIZE).unwrap(), pair[1].len() as u64);

                let mut command = Record::new(&CONTROL_COMMAND).unwrap();
                command.decode(&pair[1]).unwrap();
                (
                    command.get(SEQUENCE_NUMBER).unwrap() as u16,
                    command.get(INDEX).unwrap() as u16,
                    command.get(STATE).unwrap() as u8,
                )
            })
            .collect()
    }

    /// Like [MockTransport::control_commands] without the sequence numbers.
    pub fn targets(&self) -> Vec<(u16, u8)> {
        self.control_commands()
            .into_iter()
            .map(|(_, index, state)| (index, state))
            .collect()
    }
}

impl Transport for MockTransport {
    type DriverError = MockError;
}

impl TransportWrite for MockTransport {
    fn write(&mut self, buffer: &[u8]) -> Result<(), MockError> {
        if self.fail_write_at == Some(self.writes.len()) {
            return Err(MockError);
        }

        self.writes.push(buffer.to_vec());
        Ok(())
    }
}

impl TransportRead for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), MockError> {
        let next = self.reads.pop_front().ok_or(MockError)?;
        if next.len() != buffer.len() {
            return Err(MockError);
        }

        buffer.copy_from_slice(&next);
        Ok(())
    }
}
