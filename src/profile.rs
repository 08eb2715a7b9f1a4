/// One page of the fader address space, selected by clicking its button.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaderPage {
    /// First absolute fader index that is not on this page anymore.
    pub upper_bound: usize,
    /// Name of the button in the control mappings that selects this page.
    pub button: &'static str,
}

/// Opcodes for the `0x14` control command addressing faders and their bumps.
#[derive(Debug)]
pub struct FaderMappings {
    /// Fader opcodes relative to the active page.
    pub faders: &'static [u16],
    /// Bump opcodes relative to the active page.
    pub bumps: &'static [u16],
    /// Faders that don't belong to a page, like the master.
    pub named: &'static [(&'static str, u16)],
}

/// Static description of one console model. Adding a model means adding a profile,
/// see [crate::registry].
#[derive(Debug)]
pub struct DeviceProfile {
    pub series: &'static str,
    pub vendor_id: u16,
    pub product_id: u16,
    pub num_faders: usize,
    pub num_mems: usize,
    pub num_mem_pages: usize,
    /// Contiguous partition of `0..num_faders` in ascending order.
    pub fader_pages: &'static [FaderPage],
    pub fader_mappings: FaderMappings,
    /// Opcodes of the physical buttons by name.
    pub control_mappings: &'static [(&'static str, u16)],
}

/// Where an absolute fader index lives on the console.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaderAddress {
    pub page: FaderPage,
    /// Index of the fader on its page.
    pub relative_index: usize,
}

/// An index was outside of `0..bound`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndexOutOfRange {
    pub index: usize,
    pub bound: usize,
}

impl core::fmt::Display for IndexOutOfRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "index {} is outside of 0..{}", self.index, self.bound)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IndexOutOfRange {}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileError {
    /// The profile has no fader pages.
    NoFaderPages,
    /// A page bound is not above the previous one; contains the page position.
    UnorderedFaderPages(usize),
    /// The last page bound does not equal the amount of faders.
    IncompleteFaderPages,
    /// A page is wider than the fader or bump table.
    FaderTableTooShort,
    /// There are more memories or memory pages than entries in the fader or bump table.
    MemoryTableTooShort,
    /// A page or memory navigation button is missing in the control mappings.
    MissingButton(&'static str),
}

impl core::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProfileError::NoFaderPages => write!(f, "profile has no fader pages"),
            ProfileError::UnorderedFaderPages(position) => {
                write!(f, "fader page {} does not follow its predecessor", position)
            },
            ProfileError::IncompleteFaderPages => {
                write!(f, "fader pages don't cover all faders")
            },
            ProfileError::FaderTableTooShort => write!(f, "fader table is shorter than a page"),
            ProfileError::MemoryTableTooShort => {
                write!(f, "fader table is too short for the memories")
            },
            ProfileError::MissingButton(button) => write!(f, "button {} is not mapped", button),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProfileError {}

fn lookup(table: &[(&'static str, u16)], name: &str) -> Option<u16> {
    table
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, opcode)| *opcode)
}

impl DeviceProfile {
    /// Finds the page of an absolute fader index and the index relative to that page.
    ///
    /// The first page whose bound is above the index wins.
    pub fn resolve_fader_address(&self, index: usize) -> Result<FaderAddress, IndexOutOfRange> {
        let out_of_range = IndexOutOfRange {
            index,
            bound: self.num_faders,
        };

        if index >= self.num_faders {
            return Err(out_of_range);
        }

        let mut lower_bound = 0;
        for page in self.fader_pages {
            if index < page.upper_bound {
                return Ok(FaderAddress {
                    page: *page,
                    relative_index: index - lower_bound,
                });
            }

            lower_bound = page.upper_bound;
        }

        Err(out_of_range)
    }

    /// Opcode of a fader on the active page.
    pub fn fader_opcode(&self, relative_index: usize) -> Option<u16> {
        self.fader_mappings.faders.get(relative_index).copied()
    }

    /// Opcode of a bump on the active page.
    pub fn bump_opcode(&self, relative_index: usize) -> Option<u16> {
        self.fader_mappings.bumps.get(relative_index).copied()
    }

    /// Opcode of a fader outside the pages, e.g. `master_fader`.
    pub fn named_fader_opcode(&self, name: &str) -> Option<u16> {
        lookup(self.fader_mappings.named, name)
    }

    /// Opcode of a physical button.
    pub fn button_opcode(&self, name: &str) -> Option<u16> {
        lookup(self.control_mappings, name)
    }

    /// Checks the page table and the size of the opcode tables.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let last_page = self.fader_pages.last().ok_or(ProfileError::NoFaderPages)?;

        let mut lower_bound = 0;
        for (position, page) in self.fader_pages.iter().enumerate() {
            if page.upper_bound <= lower_bound {
                return Err(ProfileError::UnorderedFaderPages(position));
            }

            let width = page.upper_bound - lower_bound;
            if width > self.fader_mappings.faders.len() || width > self.fader_mappings.bumps.len()
            {
                return Err(ProfileError::FaderTableTooShort);
            }

            if self.button_opcode(page.button).is_none() {
                return Err(ProfileError::MissingButton(page.button));
            }

            lower_bound = page.upper_bound;
        }

        if last_page.upper_bound != self.num_faders {
            return Err(ProfileError::IncompleteFaderPages);
        }

        if self.num_mems > self.fader_mappings.faders.len()
            || self.num_mems > self.fader_mappings.bumps.len()
            || self.num_mem_pages > self.fader_mappings.bumps.len()
        {
            return Err(ProfileError::MemoryTableTooShort);
        }

        if self.num_mem_pages > 0 && self.button_opcode(crate::consts::MEMORIES_BUTTON).is_none() {
            return Err(ProfileError::MissingButton(crate::consts::MEMORIES_BUTTON));
        }

        Ok(())
    }
}
