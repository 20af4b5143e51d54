//! Point, status and repeat types shared by the binding and the backend.

use crate::error::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;

/// Smallest value of any point field.
pub const MIN_VALUE: i16 = i16::MIN;
/// Largest value of any point field.
pub const MAX_VALUE: i16 = i16::MAX;
/// [`MIN_VALUE`] as a float, for normalizing external data.
pub const MIN_VALUE_F32: f32 = MIN_VALUE as f32;
/// [`MAX_VALUE`] as a float, for normalizing external data.
pub const MAX_VALUE_F32: f32 = MAX_VALUE as f32;

/// Size in bytes of one [`Point`] record as the vendor library reads it.
pub const POINT_SIZE: usize = 16;

/// A single Ether Dream output sample.
///
/// The layout matches the vendor's point record exactly: eight signed 16-bit
/// fields in the order X, Y, R, G, B, I, AL, AR. Frames are handed to the
/// vendor library as a pointer to a contiguous array of these.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// X coordinate
    pub x: i16,
    /// Y coordinate
    pub y: i16,
    /// Red channel
    pub r: i16,
    /// Green channel
    pub g: i16,
    /// Blue channel
    pub b: i16,
    /// Intensity
    pub i: i16,
    /// Auxiliary channel, passed through untouched.
    pub al: i16,
    /// Auxiliary channel, passed through untouched.
    pub ar: i16,
}

const _: () = assert!(std::mem::size_of::<Point>() == POINT_SIZE);

impl Point {
    /// Creates a point with both auxiliary channels zeroed.
    pub fn new(x: i16, y: i16, r: i16, g: i16, b: i16, i: i16) -> Self {
        Self {
            x,
            y,
            r,
            g,
            b,
            i,
            al: 0,
            ar: 0,
        }
    }

    /// Creates a blanked point (laser off) at the given position.
    pub fn blanked(x: i16, y: i16) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }
}

/// A DAC-agnostic laser point with full-precision f32 coordinates.
///
/// Coordinates are normalized:
/// - x: -1.0 (left) to 1.0 (right)
/// - y: -1.0 (bottom) to 1.0 (top)
///
/// Colors are 16-bit unsigned (0-65535) and get halved into the positive half
/// of the signed Ether Dream range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaserPoint {
    /// X coordinate, -1.0 to 1.0
    pub x: f32,
    /// Y coordinate, -1.0 to 1.0
    pub y: f32,
    /// Red channel (0-65535)
    pub r: u16,
    /// Green channel (0-65535)
    pub g: u16,
    /// Blue channel (0-65535)
    pub b: u16,
    /// Intensity (0-65535)
    pub intensity: u16,
}

impl LaserPoint {
    /// Creates a new laser point.
    pub fn new(x: f32, y: f32, r: u16, g: u16, b: u16, intensity: u16) -> Self {
        Self {
            x,
            y,
            r,
            g,
            b,
            intensity,
        }
    }

    /// Creates a blanked point (laser off) at the given position.
    pub fn blanked(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }
}

fn coordinate(v: f32) -> i16 {
    (v.clamp(-1.0, 1.0) * MAX_VALUE_F32) as i16
}

fn channel(v: u16) -> i16 {
    (v >> 1) as i16
}

impl From<&LaserPoint> for Point {
    fn from(p: &LaserPoint) -> Self {
        Point::new(
            coordinate(p.x),
            coordinate(p.y),
            channel(p.r),
            channel(p.g),
            channel(p.b),
            channel(p.intensity),
        )
    }
}

impl From<LaserPoint> for Point {
    fn from(p: LaserPoint) -> Self {
        Point::from(&p)
    }
}

/// Device status reported by the vendor library.
///
/// This is a snapshot taken at the time of the call; nothing is cached.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// Device can accept a new frame.
    Ready = 1,
    /// Device is still playing the previous frame.
    Busy = 2,
}

impl Status {
    /// Maps the vendor's raw status value.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Status::Ready),
            2 => Some(Status::Busy),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => write!(f, "ready"),
            Status::Busy => write!(f, "busy"),
        }
    }
}

/// How many times the device replays a written frame.
///
/// The vendor's repeat field is an unsigned 16-bit count where 0 is invalid.
/// "Forever" has no value of its own: it is sent as 65535, the largest count
/// the field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Repeat {
    /// Play the frame this many times.
    Count(NonZeroU16),
    /// Keep replaying the frame.
    Forever,
}

impl Repeat {
    /// Play the frame once.
    pub const ONCE: Repeat = Repeat::Count(NonZeroU16::MIN);

    /// Creates a repeat count, rejecting 0.
    pub fn times(count: u16) -> Result<Self> {
        NonZeroU16::new(count)
            .map(Repeat::Count)
            .ok_or(Error::InvalidRepeatCount(0))
    }

    /// Translates the signed convention where -1 means forever.
    pub fn from_signed(count: i32) -> Result<Self> {
        match count {
            -1 => Ok(Repeat::Forever),
            1..=65535 => Self::times(count as u16),
            _ => Err(Error::InvalidRepeatCount(count)),
        }
    }

    /// The value handed to the vendor library.
    pub fn to_raw(self) -> u16 {
        match self {
            Repeat::Count(n) => n.get(),
            Repeat::Forever => u16::MAX,
        }
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::ONCE
    }
}

/// An Ether Dream controller known to the vendor library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    /// 0-based card number.
    pub card: usize,
    /// Name reported by the vendor library.
    pub name: String,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (card {})", self.name, self.card)
    }
}
