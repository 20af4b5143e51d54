//! Runtime binding to the Ether Dream vendor library.
//!
//! The Ether Dream is an ILDA compatible network laser DAC. Its vendor ships
//! the protocol implementation as a dynamic library (`EtherDream.dll`); this
//! crate loads that library at runtime, resolves its eight entry points, and
//! exposes them as typed, checked calls.
//!
//! # Getting Started
//!
//! ```no_run
//! use netherdream::{EtherDreamLib, Frame, Point, Repeat};
//!
//! fn main() -> netherdream::Result<()> {
//!     let mut lib = EtherDreamLib::new();
//!     lib.load()?;
//!
//!     for device in lib.list_devices()? {
//!         println!("Found {}", device);
//!     }
//!
//!     lib.open_device(0)?;
//!     let frame = Frame::new(30_000, vec![Point::new(0, 0, 32767, 0, 0, 32767)])
//!         .with_repeat(Repeat::Forever);
//!     lib.write_frame(0, &frame)?;
//!
//!     lib.stop(0)?;
//!     lib.close_device(0)?;
//!     lib.close()?;
//!     Ok(())
//! }
//! ```
//!
//! # Library lifecycle
//!
//! [`EtherDreamLib::load`] either binds every entry point or leaves the
//! binding unloaded. Once bound, the library stays mapped until the process
//! exits; [`EtherDreamLib::close`] only stops the vendor's signalling thread.
//! Every device call made before a successful load returns
//! [`Error::NotLoaded`].
//!
//! # Coordinate System
//!
//! [`Point`] fields are signed 16-bit, `-32768..=32767`, exposed as
//! [`MIN_VALUE`]/[`MAX_VALUE`] and their float forms. [`LaserPoint`] uses
//! normalized coordinates and unsigned 16-bit colors and converts into
//! [`Point`].

pub mod backend;
mod error;
pub mod frame;
pub mod library;
pub mod native;
pub mod types;

#[cfg(test)]
mod fake_vendor;

// Crate-level error types
pub use error::{Error, Result};

// Binding and lifecycle
pub use library::{
    EtherDreamLib, LibraryConfig, LibraryState, DEFAULT_LIBRARY_NAME, DEVICE_NAME_BUFFER_LEN,
};

// Backend trait and implementation
pub use backend::{EtherDreamBackend, StreamBackend, WriteOutcome};

// Core types
pub use frame::Frame;
pub use native::EntryPoints;
pub use types::{
    DeviceInfo, LaserPoint, Point, Repeat, Status, MAX_VALUE, MAX_VALUE_F32, MIN_VALUE,
    MIN_VALUE_F32, POINT_SIZE,
};
