//! Known console models.
//!
//! Models are told apart by their USB vendor and product id. To support a new model add a
//! [DeviceProfile] to [PROFILES].

use crate::consts::SMARTFADE_VENDOR_ID;
use crate::profile::{DeviceProfile, FaderMappings, FaderPage};

const fn opcode_range<const N: usize>(first: u16) -> [u16; N] {
    let mut opcodes = [0u16; N];
    let mut index = 0;
    while index < N {
        opcodes[index] = first + index as u16;
        index += 1;
    }

    opcodes
}

static SMARTFADE_1248_FADERS: [u16; 24] = opcode_range(0x0000);
static SMARTFADE_1248_BUMPS: [u16; 24] = opcode_range(0x0100);

static SMARTFADE_1248_PAGES: [FaderPage; 2] = [
    FaderPage {
        upper_bound: 24,
        button: "1-24",
    },
    FaderPage {
        upper_bound: 48,
        button: "25-48",
    },
];

/// SmartFade 1248, 48 faders on two pages.
pub static SMARTFADE_1248: DeviceProfile = DeviceProfile {
    series: "1248",
    vendor_id: SMARTFADE_VENDOR_ID,
    product_id: 0x0200,
    num_faders: 48,
    num_mems: 24,
    num_mem_pages: 12,
    fader_pages: &SMARTFADE_1248_PAGES,
    fader_mappings: FaderMappings {
        faders: &SMARTFADE_1248_FADERS,
        bumps: &SMARTFADE_1248_BUMPS,
        named: &[
            ("master_fader", 0x0030),
            ("bump_fader", 0x0031),
            ("crossfader_a", 0x0032),
            ("crossfader_b", 0x0033),
        ],
    },
    control_mappings: &[
        ("rate", 0x0130),
        ("play", 0x0131),
        ("pause", 0x0132),
        ("solo", 0x0133),
        ("blackout", 0x0134),
        ("preview", 0x0135),
        ("1-24", 0x0136),
        ("25-48", 0x0137),
        ("clear", 0x0138),
        ("memories", 0x0139),
        ("next", 0x013A),
        ("stack", 0x013B),
        ("mode", 0x013C),
        ("undo", 0x013D),
        ("copy", 0x013E),
        ("rec_seq", 0x013F),
        ("magic", 0x0140),
        ("rec_mem", 0x0141),
        ("edit_mem", 0x0142),
        ("snapshot", 0x0143),
        ("exit", 0x0144),
        ("back", 0x0145),
        ("menu", 0x0146),
        ("ind_1", 0x0147),
        ("ind_2", 0x0148),
        ("right", 0x0149),
        ("left", 0x014A),
    ],
};

/// Every supported model.
pub static PROFILES: [&DeviceProfile; 1] = [&SMARTFADE_1248];

pub fn find_by_ids(vendor_id: u16, product_id: u16) -> Option<&'static DeviceProfile> {
    PROFILES
        .iter()
        .copied()
        .find(|profile| profile.vendor_id == vendor_id && profile.product_id == product_id)
}

pub fn find_by_series(series: &str) -> Option<&'static DeviceProfile> {
    PROFILES
        .iter()
        .copied()
        .find(|profile| profile.series == series)
}

/// Which console to connect to. Handed to whatever opens the transport.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct DeviceSelector<'a> {
    /// Only consider this series, any series if `None`.
    pub series: Option<&'a str>,
    /// Use the n-th matching device when several of the same model are connected.
    pub index: usize,
}

impl<'a> DeviceSelector<'a> {
    pub fn matches(&self, profile: &DeviceProfile) -> bool {
        self.series.map_or(true, |series| profile.series == series)
    }

    /// Profiles to search for, in registry order.
    pub fn candidates(self) -> impl Iterator<Item = &'static DeviceProfile> + 'a {
        PROFILES
            .iter()
            .copied()
            .filter(move |profile| self.matches(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_are_valid() {
        for profile in PROFILES {
            profile.validate().unwrap();
        }
    }

    #[test]
    fn test_smartfade_1248_tables() {
        assert_eq!(SMARTFADE_1248_FADERS[0], 0x0000);
        assert_eq!(SMARTFADE_1248_FADERS[23], 0x0017);
        assert_eq!(SMARTFADE_1248_BUMPS[0], 0x0100);
        assert_eq!(SMARTFADE_1248_BUMPS[23], 0x0117);
        assert_eq!(SMARTFADE_1248.button_opcode("left"), Some(0x014A));
    }

    #[test]
    fn test_two_page_resolution() {
        let address = SMARTFADE_1248.resolve_fader_address(23).unwrap();
        assert_eq!((address.page.button, address.relative_index), ("1-24", 23));

        let address = SMARTFADE_1248.resolve_fader_address(24).unwrap();
        assert_eq!((address.page.button, address.relative_index), ("25-48", 0));
    }

    #[test]
    fn test_find() {
        assert_eq!(
            find_by_ids(0x14D5, 0x0200).map(|profile| profile.series),
            Some("1248")
        );
        assert!(find_by_ids(0x14D5, 0x0201).is_none());
        assert_eq!(find_by_series("1248").map(|profile| profile.product_id), Some(0x0200));
        assert!(find_by_series("2496").is_none());
    }

    #[test]
    fn test_selector() {
        assert_eq!(DeviceSelector::default().candidates().count(), 1);

        let selector = DeviceSelector {
            series: Some("2496"),
            index: 1,
        };
        assert_eq!(selector.candidates().count(), 0);
        assert!(!selector.matches(&SMARTFADE_1248));
    }
}
