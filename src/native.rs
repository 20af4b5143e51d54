//! Raw entry points exported by the Ether Dream vendor library.
//!
//! Every device call takes the card number by pointer, never by value. The
//! safe wrappers in [`crate::library`] keep that detail at this boundary.
//!
//! The vendor exports `__stdcall` functions, which `extern "system"` maps to on
//! 32-bit Windows; on every other target it is the plain C convention.

use crate::error::{Error, Result};
use crate::types::Point;
use libloading::{Library, Symbol};
use std::os::raw::{c_char, c_int};

pub const GET_CARD_NUM: &str = "EtherDreamGetCardNum";
pub const GET_DEVICE_NAME: &str = "EtherDreamGetDeviceName";
pub const GET_STATUS: &str = "EtherDreamGetStatus";
pub const OPEN_DEVICE: &str = "EtherDreamOpenDevice";
pub const CLOSE: &str = "EtherDreamClose";
pub const CLOSE_DEVICE: &str = "EtherDreamCloseDevice";
pub const STOP: &str = "EtherDreamStop";
pub const WRITE_FRAME: &str = "EtherDreamWriteFrame";

/// All required entry points, in the order they are resolved.
pub const SYMBOLS: [&str; 8] = [
    GET_CARD_NUM,
    GET_DEVICE_NAME,
    GET_STATUS,
    OPEN_DEVICE,
    CLOSE,
    CLOSE_DEVICE,
    STOP,
    WRITE_FRAME,
];

pub type GetCardNumFn = unsafe extern "system" fn() -> c_int;
pub type GetDeviceNameFn =
    unsafe extern "system" fn(card: *const c_int, buf: *mut c_char, max: c_int);
pub type GetStatusFn = unsafe extern "system" fn(card: *const c_int) -> c_int;
pub type OpenDeviceFn = unsafe extern "system" fn(card: *const c_int) -> bool;
pub type CloseFn = unsafe extern "system" fn() -> bool;
pub type CloseDeviceFn = unsafe extern "system" fn(card: *const c_int) -> bool;
pub type StopFn = unsafe extern "system" fn(card: *const c_int) -> bool;
pub type WriteFrameFn = unsafe extern "system" fn(
    card: *const c_int,
    data: *const Point,
    bytes: c_int,
    pps: u16,
    reps: u16,
) -> bool;

/// The eight typed vendor functions.
#[derive(Clone, Copy)]
pub struct EntryPoints {
    pub get_card_num: GetCardNumFn,
    pub get_device_name: GetDeviceNameFn,
    pub get_status: GetStatusFn,
    pub open_device: OpenDeviceFn,
    pub close: CloseFn,
    pub close_device: CloseDeviceFn,
    pub stop: StopFn,
    pub write_frame: WriteFrameFn,
}

impl EntryPoints {
    /// Resolves every entry point from a loaded library.
    ///
    /// Fails on the first symbol that is missing.
    ///
    /// # Safety
    ///
    /// The library must export each symbol with the signature declared above,
    /// and must stay mapped for as long as the returned pointers are called.
    pub unsafe fn resolve(lib: &Library, library_name: &str) -> Result<Self> {
        Ok(Self {
            get_card_num: symbol(lib, library_name, GET_CARD_NUM)?,
            get_device_name: symbol(lib, library_name, GET_DEVICE_NAME)?,
            get_status: symbol(lib, library_name, GET_STATUS)?,
            open_device: symbol(lib, library_name, OPEN_DEVICE)?,
            close: symbol(lib, library_name, CLOSE)?,
            close_device: symbol(lib, library_name, CLOSE_DEVICE)?,
            stop: symbol(lib, library_name, STOP)?,
            write_frame: symbol(lib, library_name, WRITE_FRAME)?,
        })
    }
}

unsafe fn symbol<T: Copy>(lib: &Library, library_name: &str, name: &'static str) -> Result<T> {
    let sym: Symbol<T> = lib
        .get(name.as_bytes())
        .map_err(|source| Error::MissingSymbol {
            library: library_name.to_string(),
            symbol: name,
            source,
        })?;
    Ok(*sym)
}
