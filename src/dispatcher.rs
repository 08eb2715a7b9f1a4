use core::ops::ControlFlow;

use crate::codec::{CodecError, Record};
use crate::consts::{ENVELOPE_SIZE, MAX_EVENT_PAYLOAD_SIZE};
use crate::frames::{self, ENVELOPE, PAYLOAD_SIZE, SEQUENCE_NUMBER};
use crate::transport::{Transport, TransportRead, TransportWrite};
use crate::types::CommandKind;

/// Opaque payload of one event frame drained from the device.
pub type EventPayload = heapless::Vec<u8, MAX_EVENT_PAYLOAD_SIZE>;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError<E> {
    /// A frame could not be built or decoded.
    Codec(CodecError),
    /// The device announced an event payload bigger than [MAX_EVENT_PAYLOAD_SIZE].
    EventTooLarge(usize),
    /// An error raised by the transport. It is never retried.
    Transport(E),
}

impl<E: core::fmt::Display> core::fmt::Display for DispatchError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DispatchError::Codec(error) => error.fmt(f),
            DispatchError::EventTooLarge(size) => {
                write!(f, "event payload of {} bytes is too large", size)
            },
            DispatchError::Transport(error) => error.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Display + core::fmt::Debug> std::error::Error for DispatchError<E> {}

impl<E> From<CodecError> for DispatchError<E> {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Wrapping 16 bit counter for sequenced payload frames.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequenceCounter(u16);

impl SequenceCounter {
    pub fn new(start: u16) -> Self {
        Self(start)
    }

    pub fn current(&self) -> u16 {
        self.0
    }

    /// Moves to the next sequence number, 65535 wraps to 0.
    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Frames payload records and owns the sequence counter of one connected device.
///
/// Every command is two writes: an envelope announcing the payload size and the payload
/// itself. The device pairs the most recent envelope with the next payload, so the two
/// writes of one command must never be interleaved with another command. Taking `&mut self`
/// gives exactly one command in flight; share a dispatcher between threads only behind a
/// mutex held across the whole call.
pub struct CommandDispatcher<T: Transport> {
    transport: T,
    sequence: SequenceCounter,
}

impl<T: Transport> CommandDispatcher<T> {
    pub fn new(transport: T, initial_sequence_number: u16) -> Self {
        Self {
            transport,
            sequence: SequenceCounter::new(initial_sequence_number),
        }
    }

    /// The sequence number the next command will carry.
    pub fn sequence_number(&self) -> u16 {
        self.sequence.current()
    }

    pub fn get_transport(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T: TransportWrite> CommandDispatcher<T> {
    /// Sends a sequenced payload record.
    ///
    /// The record has to nest the sequence header as `send_header`. Its sequence number gets
    /// overwritten with the current counter value. No acknowledgement is awaited.
    /// If writing the envelope fails, the payload is not written and the counter stays.
    pub fn send_command(
        &mut self,
        payload: &mut Record,
    ) -> Result<(), DispatchError<T::DriverError>> {
        payload.set(SEQUENCE_NUMBER, self.sequence.current() as u64)?;

        let envelope = frames::envelope(CommandKind::Send, payload.size() as u16)?;
        self.transport
            .write(&envelope.encode())
            .map_err(DispatchError::Transport)?;

        trace!(
            "sending {} #{}",
            payload.record_type().name,
            self.sequence.current()
        );
        self.transport
            .write(&payload.encode())
            .map_err(DispatchError::Transport)?;

        self.sequence.advance();
        Ok(())
    }

    /// Sends an envelope of any kind followed by an unsequenced payload.
    /// An empty payload only writes the envelope.
    pub fn send_raw(
        &mut self,
        kind: CommandKind,
        payload: &[u8],
    ) -> Result<(), DispatchError<T::DriverError>> {
        let payload_size = u16::try_from(payload.len())
            .map_err(|_| DispatchError::Codec(CodecError::ValueOverflow(PAYLOAD_SIZE)))?;

        let envelope = frames::envelope(kind, payload_size)?;
        self.transport
            .write(&envelope.encode())
            .map_err(DispatchError::Transport)?;

        if !payload.is_empty() {
            self.transport
                .write(payload)
                .map_err(DispatchError::Transport)?;
        }

        Ok(())
    }
}

impl<T: TransportWrite + TransportRead> CommandDispatcher<T> {
    /// Polls the device until its event queue is empty and returns the amount of
    /// events drained. Event payloads are discarded.
    ///
    /// <div class="warning">This blocks for as long as the device keeps reporting events and
    /// on every transport read. Use [CommandDispatcher::drain_events_with] or a transport with
    /// a read timeout if latency has to be bounded.</div>
    pub fn drain_events(&mut self) -> Result<usize, DispatchError<T::DriverError>> {
        self.drain_events_with(|_| ControlFlow::Continue(()))
    }

    /// Polls the device until its event queue is empty or the handler breaks.
    /// Every event payload is handed to the handler undecoded.
    /// Returns the amount of events received.
    pub fn drain_events_with<F>(
        &mut self,
        mut handler: F,
    ) -> Result<usize, DispatchError<T::DriverError>>
    where
        F: FnMut(&[u8]) -> ControlFlow<()>,
    {
        let poll = frames::envelope(CommandKind::Poll, 0)?.encode();
        let mut response = Record::new(&ENVELOPE)?;
        let mut events = 0;

        loop {
            self.transport
                .write(&poll)
                .map_err(DispatchError::Transport)?;

            let mut response_buffer = [0u8; ENVELOPE_SIZE];
            self.transport
                .read(&mut response_buffer)
                .map_err(DispatchError::Transport)?;
            response.decode(&response_buffer)?;

            let payload_size = response.get(PAYLOAD_SIZE)? as usize;
            if payload_size == 0 {
                trace!("event queue empty after {} event(s)", events);
                return Ok(events);
            }

            if payload_size > MAX_EVENT_PAYLOAD_SIZE {
                warn!("device announced an event of {} bytes", payload_size);
                return Err(DispatchError::EventTooLarge(payload_size));
            }

            let mut payload = EventPayload::new();
            // cannot fail, checked against the capacity above
            let _ = payload.resize(payload_size, 0);
            self.transport
                .read(&mut payload)
                .map_err(DispatchError::Transport)?;

            events += 1;
            debug!("drained event of {} bytes", payload_size);

            if handler(&payload).is_break() {
                return Ok(events);
            }
        }
    }
}
