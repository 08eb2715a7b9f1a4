//! Rust library for driving SmartFade lighting consoles over their vendor USB protocol by
//! using interchangeable transports. This library features no-std as well as no-alloc support
//! (no heap allocation) to target embedded as well as os platforms.
//!
//! The protocol is not documented by the vendor. Everything here has been observed on real
//! devices, commands are not acknowledged and the meaning of the sequence numbers is unknown.
//!
//! <div class="warning">This library is wip, it has not yet received extensive testing and the api
//! might not be final.</div>
//!
//! # Usage
//! Finding the device and claiming its vendor interface is left to the transport. Any
//! blocking byte stream can be used through [transport::IoTransport].
//!
//! ```rust
//! use smartfade::console::{SmartFade, SmartFadeConfig};
//! use smartfade::registry::{self, DeviceSelector};
//! use smartfade::transport::{Transport, TransportWrite};
//!
//! /// Prints every frame instead of sending it.
//! struct HexDump;
//!
//! impl Transport for HexDump {
//!     type DriverError = std::io::Error;
//! }
//!
//! impl TransportWrite for HexDump {
//!     fn write(&mut self, buffer: &[u8]) -> Result<(), std::io::Error> {
//!         println!("{:02X?}", buffer);
//!         Ok(())
//!     }
//! }
//!
//! let selector = DeviceSelector { series: Some("1248"), index: 0 };
//! let profile = selector.candidates().next().unwrap();
//! assert_eq!(
//!     registry::find_by_ids(profile.vendor_id, profile.product_id).map(|found| found.series),
//!     Some("1248")
//! );
//!
//! let mut console = SmartFade::connect(HexDump, profile, &SmartFadeConfig::default());
//!
//! // Switch to the second page and pull up fader 31.
//! console.set_fader(30, 255, true).unwrap();
//!
//! // Flash memory 4 of memory page 3.
//! console.set_memory_bump(3, true, Some(2)).unwrap();
//! console.set_memory_bump(3, false, None).unwrap();
//!
//! console.click_button("blackout").unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod macros;

/// Declarative binary records with per field byte order.
pub mod codec;
/// Module for controlling a console through its fader, memory and button numbering.
pub mod console;
pub mod consts;
/// Module for framing commands and draining device events.
pub mod dispatcher;
/// Record types of the wire protocol.
pub mod frames;
pub mod profile;
pub mod registry;
/// Module for implementing transports to the device, like usb bulk endpoints or mockups.
pub mod transport;
pub mod types;

#[cfg(all(test, feature = "std"))]
mod test_utils;
