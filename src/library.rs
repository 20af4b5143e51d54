//! Loading the vendor library and calling into it.
//!
//! [`EtherDreamLib`] is the one piece of state this crate keeps: whether the
//! vendor library is bound, and the entry points resolved from it. Devices
//! themselves are addressed by card number and all of their state lives in
//! the vendor library.
//!
//! # Lifecycle
//!
//! ```text
//! NotLoaded --load() ok--> Bound
//! NotLoaded --load() err-> NotLoaded
//! Bound --close()--> Bound
//! ```
//!
//! A failed bind unloads the library again, so a partial binding is never
//! observable. Once bound, the library stays mapped until the process exits:
//! [`EtherDreamLib::close`] only stops the vendor's signalling thread, and
//! dropping an [`EtherDreamLib`] does not unmap the library either.
//!
//! Nothing here is synchronized beyond what `&`/`&mut` already enforce. The
//! vendor library assumes one binding per process; create one
//! [`EtherDreamLib`] and share it.

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::native::EntryPoints;
use crate::types::{DeviceInfo, Point, Repeat, Status};
use libloading::Library;
use std::ffi::CStr;
use std::fmt;
use std::mem::ManuallyDrop;
use std::os::raw::c_int;
use std::path::{Path, PathBuf};

/// Base name of the vendor library.
pub const DEFAULT_LIBRARY_NAME: &str = "EtherDream";

/// Size of the buffer handed to the vendor for device names, terminator included.
pub const DEVICE_NAME_BUFFER_LEN: usize = 256;

/// Which vendor library file to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Base name, without platform prefix or extension.
    pub name: String,
    /// Directory to load from. `None` uses the platform's library search path.
    pub search_dir: Option<PathBuf>,
    /// Exact file to load, overriding name and directory.
    pub path: Option<PathBuf>,
}

impl LibraryConfig {
    /// Creates a config for the default `EtherDream` library.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_LIBRARY_NAME.to_string(),
            search_dir: None,
            path: None,
        }
    }

    /// Overrides the library base name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Loads from this directory instead of the search path.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    /// Loads exactly this file.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Platform file name of the library, e.g. `EtherDream.dll` or `libEtherDream.so`.
    pub fn file_name(&self) -> String {
        if let Some(name) = self.path.as_deref().and_then(Path::file_name) {
            return name.to_string_lossy().into_owned();
        }
        libloading::library_filename(&self.name)
            .to_string_lossy()
            .into_owned()
    }

    /// Path handed to the platform loader.
    pub fn library_path(&self) -> PathBuf {
        match (&self.path, &self.search_dir) {
            (Some(path), _) => path.clone(),
            (None, Some(dir)) => dir.join(self.file_name()),
            (None, None) => PathBuf::from(self.file_name()),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the vendor library is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryState {
    /// No successful load yet.
    NotLoaded,
    /// Library mapped and every entry point resolved.
    Bound,
}

impl fmt::Display for LibraryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryState::NotLoaded => write!(f, "not loaded"),
            LibraryState::Bound => write!(f, "bound"),
        }
    }
}

struct Bound {
    // Never dropped: the vendor's thread may still be running its code.
    _library: Option<ManuallyDrop<Library>>,
    entry: EntryPoints,
}

/// Binding to the Ether Dream vendor library.
pub struct EtherDreamLib {
    config: LibraryConfig,
    bound: Option<Bound>,
}

impl EtherDreamLib {
    /// Creates an unloaded binding for the default library.
    pub fn new() -> Self {
        Self::with_config(LibraryConfig::new())
    }

    /// Creates an unloaded binding for the given library.
    pub fn with_config(config: LibraryConfig) -> Self {
        Self {
            config,
            bound: None,
        }
    }

    /// Creates a bound binding from entry points obtained elsewhere.
    ///
    /// # Safety
    ///
    /// Every pointer in `entry` must implement the vendor contract for its
    /// entry point and stay callable for the lifetime of the returned value.
    pub unsafe fn from_entry_points(entry: EntryPoints) -> Self {
        Self {
            config: LibraryConfig::new(),
            bound: Some(Bound {
                _library: None,
                entry,
            }),
        }
    }

    /// Loads the vendor library and resolves all of its entry points.
    ///
    /// Either every entry point is bound or the library is unloaded again and
    /// the state stays [`LibraryState::NotLoaded`]. Calling this when already
    /// bound does nothing.
    pub fn load(&mut self) -> Result<()> {
        if self.bound.is_some() {
            log::debug!("{} already loaded", self.config.file_name());
            return Ok(());
        }

        let path = self.config.library_path();
        let file_name = self.config.file_name();

        // SAFETY: loading runs the library's initialisers; the vendor library is
        // trusted to be the Ether Dream driver.
        let library = match unsafe { Library::new(&path) } {
            Ok(library) => library,
            Err(source) => {
                log::error!(
                    "Unable to load library {}, is it in a PATH related directory? ({})",
                    file_name,
                    source
                );
                return Err(Error::LibraryNotFound {
                    library: file_name,
                    source,
                });
            }
        };

        // SAFETY: signatures follow the vendor header; the library is kept
        // mapped for the rest of the process once bound.
        match unsafe { EntryPoints::resolve(&library, &file_name) } {
            Ok(entry) => {
                log::info!("Loaded and bound {}", path.display());
                self.bound = Some(Bound {
                    _library: Some(ManuallyDrop::new(library)),
                    entry,
                });
                Ok(())
            }
            Err(err) => {
                log::error!("Unable to bind library {}: {}", file_name, err);
                if let Err(e) = library.close() {
                    log::warn!("Failed to unload {}: {}", file_name, e);
                }
                Err(err)
            }
        }
    }

    /// Returns true once the library is loaded and bound.
    pub fn is_loaded(&self) -> bool {
        self.bound.is_some()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LibraryState {
        if self.bound.is_some() {
            LibraryState::Bound
        } else {
            LibraryState::NotLoaded
        }
    }

    /// The library this binding loads.
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    fn entry_points(&self, operation: &'static str) -> Result<&EntryPoints> {
        match &self.bound {
            Some(bound) => Ok(&bound.entry),
            None => {
                log::error!(
                    "{} called before the Ether Dream library was loaded",
                    operation
                );
                Err(Error::NotLoaded { operation })
            }
        }
    }

    /// Number of attached Ether Dream controllers.
    pub fn count_devices(&self) -> Result<usize> {
        let entry = self.entry_points("count_devices")?;
        let count = unsafe { (entry.get_card_num)() };
        usize::try_from(count).or_else(|_| {
            log::warn!("Vendor reported a negative device count ({})", count);
            Ok(0)
        })
    }

    /// Name of the controller with the given 0-based card number.
    ///
    /// Names longer than the fixed buffer are truncated.
    pub fn device_name(&self, card: usize) -> Result<String> {
        let entry = self.entry_points("device_name")?;
        let card_num = card_number(card)?;

        let mut buf = [0u8; DEVICE_NAME_BUFFER_LEN];
        unsafe {
            (entry.get_device_name)(
                &card_num,
                buf.as_mut_ptr().cast(),
                DEVICE_NAME_BUFFER_LEN as c_int,
            )
        };
        buf[DEVICE_NAME_BUFFER_LEN - 1] = 0;

        Ok(CStr::from_bytes_until_nul(&buf)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default())
    }

    /// Current status of a controller.
    pub fn status(&self, card: usize) -> Result<Status> {
        let entry = self.entry_points("status")?;
        let card_num = card_number(card)?;
        let raw = unsafe { (entry.get_status)(&card_num) };
        Status::from_raw(raw).ok_or(Error::UnknownStatus { card, raw })
    }

    /// Opens a communication session with a controller.
    pub fn open_device(&self, card: usize) -> Result<()> {
        let entry = self.entry_points("open_device")?;
        let card_num = card_number(card)?;
        let ok = unsafe { (entry.open_device)(&card_num) };
        log::debug!("open_device({}) -> {}", card, ok);
        check(ok, "open_device", card)
    }

    /// Ends the communication session with a controller.
    pub fn close_device(&self, card: usize) -> Result<()> {
        let entry = self.entry_points("close_device")?;
        let card_num = card_number(card)?;
        let ok = unsafe { (entry.close_device)(&card_num) };
        log::debug!("close_device({}) -> {}", card, ok);
        check(ok, "close_device", card)
    }

    /// Halts output on an open controller.
    pub fn stop(&self, card: usize) -> Result<()> {
        let entry = self.entry_points("stop")?;
        let card_num = card_number(card)?;
        let ok = unsafe { (entry.stop)(&card_num) };
        check(ok, "stop", card)
    }

    /// Writes a frame to an open controller.
    pub fn write_frame(&self, card: usize, frame: &Frame) -> Result<()> {
        self.write_points(card, &frame.points, frame.pps, frame.repeat)
    }

    /// Writes points to an open controller.
    ///
    /// The byte count handed to the vendor is always `points.len() * 16`.
    pub fn write_points(
        &self,
        card: usize,
        points: &[Point],
        pps: u16,
        repeat: Repeat,
    ) -> Result<()> {
        let entry = self.entry_points("write_frame")?;
        let card_num = card_number(card)?;
        let bytes = c_int::try_from(std::mem::size_of_val(points)).map_err(|_| {
            Error::FrameTooLarge {
                points: points.len(),
            }
        })?;

        log::trace!(
            "write_frame({}): {} points at {} pps, reps {}",
            card,
            points.len(),
            pps,
            repeat.to_raw()
        );
        let ok = unsafe {
            (entry.write_frame)(&card_num, points.as_ptr(), bytes, pps, repeat.to_raw())
        };
        check(ok, "write_frame", card)
    }

    /// Writes a frame held as raw point records.
    ///
    /// The buffer is decoded first, so a partial trailing record is rejected
    /// instead of reaching the vendor.
    pub fn write_frame_bytes(
        &self,
        card: usize,
        bytes: &[u8],
        pps: u16,
        repeat: Repeat,
    ) -> Result<()> {
        let points = Frame::decode_points(bytes)?;
        self.write_points(card, &points, pps, repeat)
    }

    /// Shuts down the vendor's signalling thread.
    ///
    /// The library stays mapped and the binding stays bound.
    pub fn close(&self) -> Result<()> {
        let entry = self.entry_points("close")?;
        if unsafe { (entry.close)() } {
            log::debug!("Ether Dream signalling thread stopped");
            Ok(())
        } else {
            Err(Error::ShutdownFailed)
        }
    }

    /// Every attached controller with its name.
    pub fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        (0..self.count_devices()?)
            .map(|card| {
                Ok(DeviceInfo {
                    card,
                    name: self.device_name(card)?,
                })
            })
            .collect()
    }
}

impl Default for EtherDreamLib {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EtherDreamLib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtherDreamLib")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

fn card_number(card: usize) -> Result<c_int> {
    c_int::try_from(card).map_err(|_| Error::InvalidCard(card))
}

fn check(ok: bool, operation: &'static str, card: usize) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::DeviceOperation { operation, card })
    }
}
