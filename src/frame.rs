//! Frames of points and their raw wire layout.
//!
//! The vendor library reads a frame as a contiguous array of 16-byte point
//! records in host byte order. [`Frame::encode`] and [`Frame::decode_points`]
//! produce and parse that layout, for callers that keep frames as raw bytes.

use crate::error::{Error, Result};
use crate::types::{LaserPoint, Point, Repeat, POINT_SIZE};
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// A point buffer plus how the device should play it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Output rate in points per second.
    pub pps: u16,
    /// Points in output order.
    pub points: Vec<Point>,
    /// How many times the device replays the points.
    pub repeat: Repeat,
}

impl Frame {
    /// Creates a frame that plays once.
    pub fn new(pps: u16, points: Vec<Point>) -> Self {
        Self {
            pps,
            points,
            repeat: Repeat::ONCE,
        }
    }

    /// Creates a frame from DAC-agnostic points.
    pub fn from_laser_points(pps: u16, points: &[LaserPoint]) -> Self {
        Self::new(pps, points.iter().map(Point::from).collect())
    }

    /// Sets how many times the frame is replayed.
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Size of the point data in bytes.
    pub fn byte_len(&self) -> usize {
        self.points.len() * POINT_SIZE
    }

    /// Encodes the points into the vendor's record layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.byte_len());
        for point in &self.points {
            // Writing into a Vec cannot fail.
            let _ = write_point(&mut buf, point);
        }
        buf
    }

    /// Decodes a buffer of point records.
    ///
    /// Fails if the buffer holds a partial record.
    pub fn decode_points(bytes: &[u8]) -> Result<Vec<Point>> {
        if bytes.len() % POINT_SIZE != 0 {
            return Err(Error::MalformedFrame { len: bytes.len() });
        }

        let mut reader = bytes;
        let mut points = Vec::with_capacity(bytes.len() / POINT_SIZE);
        while !reader.is_empty() {
            let point =
                read_point(&mut reader).map_err(|_| Error::MalformedFrame { len: bytes.len() })?;
            points.push(point);
        }
        Ok(points)
    }
}

/// Writes one point record.
pub fn write_point<W: Write>(w: &mut W, p: &Point) -> io::Result<()> {
    for field in [p.x, p.y, p.r, p.g, p.b, p.i, p.al, p.ar] {
        w.write_i16::<NativeEndian>(field)?;
    }
    Ok(())
}

/// Reads one point record.
pub fn read_point<R: Read>(r: &mut R) -> io::Result<Point> {
    Ok(Point {
        x: r.read_i16::<NativeEndian>()?,
        y: r.read_i16::<NativeEndian>()?,
        r: r.read_i16::<NativeEndian>()?,
        g: r.read_i16::<NativeEndian>()?,
        b: r.read_i16::<NativeEndian>()?,
        i: r.read_i16::<NativeEndian>()?,
        al: r.read_i16::<NativeEndian>()?,
        ar: r.read_i16::<NativeEndian>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_point_survives_wire_layout() {
        let frame = Frame::new(30_000, vec![Point::default()]);
        let bytes = frame.encode();
        assert_eq!(bytes, vec![0u8; POINT_SIZE]);

        let points = Frame::decode_points(&bytes).unwrap();
        assert_eq!(points, vec![Point::default()]);
    }

    #[test]
    fn fields_are_laid_out_in_vendor_order() {
        let point = Point {
            x: 1,
            y: 2,
            r: 3,
            g: 4,
            b: 5,
            i: 6,
            al: 7,
            ar: 8,
        };
        let bytes = Frame::new(1000, vec![point]).encode();

        let fields: Vec<i16> = bytes
            .chunks_exact(2)
            .map(|c| i16::from_ne_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(fields, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn encoding_matches_in_memory_layout() {
        let points = vec![Point::new(-32768, 32767, 100, 200, 300, 400)];
        let bytes = Frame::new(1000, points.clone()).encode();

        // SAFETY: Point is repr(C) with only i16 fields and no padding.
        let raw = unsafe {
            std::slice::from_raw_parts(points.as_ptr() as *const u8, POINT_SIZE * points.len())
        };
        assert_eq!(bytes, raw);
    }

    #[test]
    fn partial_record_is_rejected() {
        let bytes = vec![0u8; POINT_SIZE + 3];
        assert!(matches!(
            Frame::decode_points(&bytes),
            Err(Error::MalformedFrame { len }) if len == POINT_SIZE + 3
        ));
    }

    #[test]
    fn byte_len_counts_whole_records() {
        let frame = Frame::new(1000, vec![Point::default(); 10]);
        assert_eq!(frame.byte_len(), 160);
        assert_eq!(frame.encode().len(), 160);
    }

    #[test]
    fn from_laser_points_converts_each_point() {
        let frame = Frame::from_laser_points(
            20_000,
            &[LaserPoint::blanked(0.0, 0.0), LaserPoint::new(1.0, 1.0, 65535, 65535, 65535, 65535)],
        );
        assert_eq!(frame.points.len(), 2);
        assert_eq!(frame.points[1].x, 32767);
        assert_eq!(frame.repeat, Repeat::ONCE);
    }

    #[test]
    fn with_repeat_overrides_default() {
        let frame = Frame::new(1000, vec![]).with_repeat(Repeat::Forever);
        assert_eq!(frame.repeat.to_raw(), u16::MAX);
    }
}
