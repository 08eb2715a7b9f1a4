use core::ops::ControlFlow;

use crate::codec::CodecError;
use crate::consts::{LEVEL_MAX, MEMORIES_BUTTON, STATE_OFF, STATE_ON};
use crate::dispatcher::{CommandDispatcher, DispatchError};
use crate::frames::control_command;
use crate::profile::{DeviceProfile, IndexOutOfRange};
use crate::transport::{Transport, TransportRead, TransportWrite};

#[derive(Debug)]
pub struct SmartFadeConfig {
    /// Sequence number of the first command sent after connecting.
    pub initial_sequence_number: u16,
}

impl Default for SmartFadeConfig {
    fn default() -> Self {
        Self {
            initial_sequence_number: 0,
        }
    }
}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError<E> {
    /// A fader, memory or page index is not available on this model.
    IndexOutOfRange(IndexOutOfRange),
    /// A level is above 255; contains the requested level.
    ValueOutOfRange(u16),
    /// The button or fader name is not mapped in the device profile.
    UnknownControl,
    /// Building or writing the command failed.
    Dispatch(DispatchError<E>),
}

impl<E: core::fmt::Display> core::fmt::Display for ConsoleError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConsoleError::IndexOutOfRange(error) => error.fmt(f),
            ConsoleError::ValueOutOfRange(value) => {
                write!(f, "value {} is outside of 0..=255", value)
            },
            ConsoleError::UnknownControl => write!(f, "control is not mapped"),
            ConsoleError::Dispatch(error) => error.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Display + core::fmt::Debug> std::error::Error for ConsoleError<E> {}

impl<E> From<DispatchError<E>> for ConsoleError<E> {
    fn from(value: DispatchError<E>) -> Self {
        Self::Dispatch(value)
    }
}

impl<E> From<CodecError> for ConsoleError<E> {
    fn from(value: CodecError) -> Self {
        Self::Dispatch(DispatchError::Codec(value))
    }
}

impl<E> From<IndexOutOfRange> for ConsoleError<E> {
    fn from(value: IndexOutOfRange) -> Self {
        Self::IndexOutOfRange(value)
    }
}

fn check_index<E>(index: usize, bound: usize) -> Result<(), ConsoleError<E>> {
    if index >= bound {
        return Err(ConsoleError::IndexOutOfRange(IndexOutOfRange { index, bound }));
    }

    Ok(())
}

fn check_level<E>(level: u16) -> Result<u8, ConsoleError<E>> {
    if level > LEVEL_MAX {
        return Err(ConsoleError::ValueOutOfRange(level));
    }

    Ok(level as u8)
}

fn bump_state(on: bool) -> u8 {
    if on {
        STATE_ON
    } else {
        STATE_OFF
    }
}

/// A connected SmartFade addressed through the flat fader and memory numbering of
/// its [DeviceProfile].
///
/// Faders are addressed by their absolute index, the console picks the page. Memories
/// are addressed by their index on a memory page that has to be selected explicitly.
///
/// <div class="warning">Only one bump can be active on the whole console. Switching pages,
/// even to the page that is already active, releases every engaged bump.</div>
pub struct SmartFade<T: Transport> {
    dispatcher: CommandDispatcher<T>,
    profile: &'static DeviceProfile,
}

impl<T: Transport> SmartFade<T> {
    /// Takes an already opened transport. The sequence counter starts with this call.
    ///
    /// Profiles from [crate::registry] are known to be valid, custom profiles should be
    /// checked with [DeviceProfile::validate] first.
    pub fn connect(
        transport: T,
        profile: &'static DeviceProfile,
        config: &SmartFadeConfig,
    ) -> Self {
        debug!(
            "connected to SmartFade {} ({:#x}:{:#x})",
            profile.series, profile.vendor_id, profile.product_id
        );

        Self {
            dispatcher: CommandDispatcher::new(transport, config.initial_sequence_number),
            profile,
        }
    }

    pub fn profile(&self) -> &'static DeviceProfile {
        self.profile
    }

    /// Get a reference to the dispatcher, for sending custom records.
    pub fn get_dispatcher(&mut self) -> &mut CommandDispatcher<T> {
        &mut self.dispatcher
    }

    /// Gives the transport back so its owner can release it.
    pub fn close(self) -> T {
        debug!("disconnecting SmartFade {}", self.profile.series);
        self.dispatcher.into_transport()
    }
}

impl<T: TransportWrite> SmartFade<T> {
    fn send_control(&mut self, index: u16, state: u8) -> Result<(), ConsoleError<T::DriverError>> {
        trace!("control {:#x} -> {}", index, state);
        let mut command = control_command(index, state)?;
        self.dispatcher.send_command(&mut command)?;

        Ok(())
    }

    fn fader_opcode(&self, relative_index: usize) -> Result<u16, IndexOutOfRange> {
        self.profile
            .fader_opcode(relative_index)
            .ok_or(IndexOutOfRange {
                index: relative_index,
                bound: self.profile.fader_mappings.faders.len(),
            })
    }

    fn bump_opcode(&self, relative_index: usize) -> Result<u16, IndexOutOfRange> {
        self.profile
            .bump_opcode(relative_index)
            .ok_or(IndexOutOfRange {
                index: relative_index,
                bound: self.profile.fader_mappings.bumps.len(),
            })
    }

    /// Resolves the page of the fader, optionally clicking the page button first.
    fn fader_page_index(
        &mut self,
        index: usize,
        switch_page: bool,
    ) -> Result<usize, ConsoleError<T::DriverError>> {
        if switch_page {
            self.goto_fader_page(index)
        } else {
            Ok(self.profile.resolve_fader_address(index)?.relative_index)
        }
    }

    /// Sets the state of a named button.
    pub fn set_button(
        &mut self,
        name: &str,
        pressed: bool,
    ) -> Result<(), ConsoleError<T::DriverError>> {
        let opcode = match self.profile.button_opcode(name) {
            Some(opcode) => opcode,
            None => {
                warn!("button {} is not mapped", name);
                return Err(ConsoleError::UnknownControl);
            },
        };

        self.send_control(opcode, bump_state(pressed))
    }

    pub fn press_button(&mut self, name: &str) -> Result<(), ConsoleError<T::DriverError>> {
        self.set_button(name, true)
    }

    pub fn release_button(&mut self, name: &str) -> Result<(), ConsoleError<T::DriverError>> {
        self.set_button(name, false)
    }

    /// Presses and releases a button.
    pub fn click_button(&mut self, name: &str) -> Result<(), ConsoleError<T::DriverError>> {
        self.press_button(name)?;
        self.release_button(name)
    }

    /// Sets a fader outside the pages, like `master_fader` or `crossfader_a`.
    pub fn set_named_fader(
        &mut self,
        name: &str,
        level: u16,
    ) -> Result<(), ConsoleError<T::DriverError>> {
        let level = check_level(level)?;
        let opcode = self
            .profile
            .named_fader_opcode(name)
            .ok_or(ConsoleError::UnknownControl)?;

        self.send_control(opcode, level)
    }

    /// Switches to the page of the fader by clicking the page button.
    /// Returns the index of the fader on that page.
    ///
    /// This releases all bumps, even if the page is already active.
    pub fn goto_fader_page(&mut self, index: usize) -> Result<usize, ConsoleError<T::DriverError>> {
        let address = self.profile.resolve_fader_address(index)?;

        debug!("switching to fader page {}", address.page.button);
        self.click_button(address.page.button)?;

        Ok(address.relative_index)
    }

    /// Sets the level of a fader between 0 and 255.
    ///
    /// Without `switch_page` the caller has to make sure the page of the fader is active,
    /// otherwise the fader at the same position on the active page is set.
    pub fn set_fader(
        &mut self,
        index: usize,
        level: u16,
        switch_page: bool,
    ) -> Result<(), ConsoleError<T::DriverError>> {
        check_index(index, self.profile.num_faders)?;
        let level = check_level(level)?;

        let relative_index = self.fader_page_index(index, switch_page)?;
        let opcode = self.fader_opcode(relative_index)?;
        self.send_control(opcode, level)
    }

    /// Engages or releases the bump of a fader.
    ///
    /// Engaging a bump releases the bump that was engaged before, on any page.
    /// With `switch_page` every engaged bump is released by the page switch.
    pub fn set_fader_bump(
        &mut self,
        index: usize,
        on: bool,
        switch_page: bool,
    ) -> Result<(), ConsoleError<T::DriverError>> {
        check_index(index, self.profile.num_faders)?;

        let relative_index = self.fader_page_index(index, switch_page)?;
        let opcode = self.bump_opcode(relative_index)?;
        self.send_control(opcode, bump_state(on))
    }

    /// Selects a memory page: hold `memories`, pulse the bump of the page, release `memories`.
    ///
    /// This releases all bumps, even if the page is already active.
    pub fn goto_memory_page(&mut self, page: usize) -> Result<(), ConsoleError<T::DriverError>> {
        check_index(page, self.profile.num_mem_pages)?;
        let opcode = self.bump_opcode(page)?;

        debug!("switching to memory page {}", page);
        self.press_button(MEMORIES_BUTTON)?;
        self.send_control(opcode, STATE_ON)?;
        self.send_control(opcode, STATE_OFF)?;
        self.release_button(MEMORIES_BUTTON)
    }

    /// Sets the level of a memory between 0 and 255. When a page is given it gets
    /// selected first, otherwise the memory on the active page is set.
    pub fn set_memory(
        &mut self,
        index: usize,
        level: u16,
        page: Option<usize>,
    ) -> Result<(), ConsoleError<T::DriverError>> {
        check_index(index, self.profile.num_mems)?;
        let level = check_level(level)?;
        let opcode = self.fader_opcode(index)?;

        if let Some(page) = page {
            self.goto_memory_page(page)?;
        }

        self.send_control(opcode, level)
    }

    /// Engages or releases the bump of a memory. When a page is given it gets
    /// selected first, which releases all bumps.
    pub fn set_memory_bump(
        &mut self,
        index: usize,
        on: bool,
        page: Option<usize>,
    ) -> Result<(), ConsoleError<T::DriverError>> {
        check_index(index, self.profile.num_mems)?;
        let opcode = self.bump_opcode(index)?;

        if let Some(page) = page {
            self.goto_memory_page(page)?;
        }

        self.send_control(opcode, bump_state(on))
    }
}

impl<T: TransportWrite + TransportRead> SmartFade<T> {
    /// Discards all queued device events. See [CommandDispatcher::drain_events].
    pub fn drain_events(&mut self) -> Result<usize, ConsoleError<T::DriverError>> {
        Ok(self.dispatcher.drain_events()?)
    }

    /// Hands all queued device events to the handler. See [CommandDispatcher::drain_events_with].
    pub fn drain_events_with<F>(
        &mut self,
        handler: F,
    ) -> Result<usize, ConsoleError<T::DriverError>>
    where
        F: FnMut(&[u8]) -> ControlFlow<()>,
    {
        Ok(self.dispatcher.drain_events_with(handler)?)
    }
}
