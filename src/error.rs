//! Crate-level error types.

use thiserror::Error;

/// Errors that can occur while loading or calling the Ether Dream library.
#[derive(Error, Debug)]
pub enum Error {
    /// The vendor library could not be found or mapped into the process.
    #[error("unable to load library {library}, is it on the library search path?")]
    LibraryNotFound {
        library: String,
        #[source]
        source: libloading::Error,
    },

    /// The vendor library loaded but does not export a required entry point.
    #[error("unable to bind {symbol} from {library}")]
    MissingSymbol {
        library: String,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// A device call was made before the library was loaded and bound.
    #[error("{operation} called before the Ether Dream library was loaded")]
    NotLoaded { operation: &'static str },

    /// The vendor reported failure for a device call.
    #[error("{operation} failed for card {card}")]
    DeviceOperation { operation: &'static str, card: usize },

    /// The vendor failed to shut down its signalling thread.
    #[error("failed to shut down the Ether Dream signalling thread")]
    ShutdownFailed,

    /// The vendor reported a status value outside of ready/busy.
    #[error("card {card} reported unknown status {raw}")]
    UnknownStatus { card: usize, raw: i32 },

    /// The card index does not fit the vendor's card number type.
    #[error("card index {0} is out of range")]
    InvalidCard(usize),

    /// Repeat counts must be -1 (forever) or 1..=65535.
    #[error("invalid repeat count {0}: use -1 for forever or 1..=65535")]
    InvalidRepeatCount(i32),

    /// Point rate does not fit the vendor's 16-bit rate field.
    #[error("points per second {0} exceeds 65535")]
    PpsOutOfRange(u32),

    /// The frame's byte size does not fit the vendor's byte count type.
    #[error("frame of {points} points is too large")]
    FrameTooLarge { points: usize },

    /// A raw frame buffer does not hold a whole number of point records.
    #[error("frame buffer of {len} bytes is not a whole number of points")]
    MalformedFrame { len: usize },

    /// A streaming backend was used without an open session.
    #[error("disconnected: {0}")]
    Disconnected(String),
}

impl Error {
    /// Create a disconnected error.
    pub fn disconnected(msg: impl Into<String>) -> Self {
        Self::Disconnected(msg.into())
    }

    /// Returns true for failures caused by a missing or unusable vendor library.
    ///
    /// These are installation problems rather than logic errors in the caller.
    pub fn is_library_error(&self) -> bool {
        matches!(
            self,
            Self::LibraryNotFound { .. } | Self::MissingSymbol { .. } | Self::NotLoaded { .. }
        )
    }
}

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, Error>;
