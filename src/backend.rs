//! Streaming backend over the vendor library.
//!
//! [`StreamBackend`] is the interface a point scheduler drives;
//! [`EtherDreamBackend`] implements it for one card of a shared
//! [`EtherDreamLib`].

use crate::error::{Error, Result};
use crate::library::EtherDreamLib;
use crate::types::{LaserPoint, Point, Repeat, Status};
use std::sync::Arc;

/// Write result from a backend chunk submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The chunk was accepted and written.
    Written,
    /// The device cannot accept more data right now.
    WouldBlock,
}

/// Backend trait for streaming DAC output.
///
/// The key contract is backpressure: `try_write_chunk` must return
/// `WriteOutcome::WouldBlock` when the device cannot accept more data,
/// so the caller can pace output.
pub trait StreamBackend: Send + 'static {
    /// Connect to the device.
    fn connect(&mut self) -> Result<()>;

    /// Disconnect from the device.
    fn disconnect(&mut self) -> Result<()>;

    /// Returns whether the device is connected.
    fn is_connected(&self) -> bool;

    /// Attempt to write a chunk of points at the given PPS.
    ///
    /// Returns `Err(...)` only for actual errors, never for a busy device.
    fn try_write_chunk(&mut self, pps: u32, points: &[LaserPoint]) -> Result<WriteOutcome>;

    /// Stop output.
    fn stop(&mut self) -> Result<()>;
}

/// Ether Dream backend for a single card.
pub struct EtherDreamBackend {
    lib: Arc<EtherDreamLib>,
    card: usize,
    connected: bool,
}

impl EtherDreamBackend {
    /// Create a backend for the given card of a loaded library.
    pub fn new(lib: Arc<EtherDreamLib>, card: usize) -> Self {
        Self {
            lib,
            card,
            connected: false,
        }
    }

    /// The card number this backend drives.
    pub fn card(&self) -> usize {
        self.card
    }
}

impl StreamBackend for EtherDreamBackend {
    fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }

        let count = self.lib.count_devices()?;
        if self.card >= count {
            return Err(Error::disconnected(format!(
                "Device index {} out of range (found {} devices)",
                self.card, count
            )));
        }

        self.lib.open_device(self.card)?;
        self.connected = true;
        log::info!("Connected to Ether Dream card {}", self.card);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;
        let _ = self.lib.stop(self.card);
        self.lib.close_device(self.card)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn try_write_chunk(&mut self, pps: u32, points: &[LaserPoint]) -> Result<WriteOutcome> {
        if !self.connected {
            return Err(Error::disconnected("Not connected"));
        }
        if points.is_empty() {
            return Ok(WriteOutcome::WouldBlock);
        }

        let pps = u16::try_from(pps).map_err(|_| Error::PpsOutOfRange(pps))?;

        match self.lib.status(self.card)? {
            Status::Ready => {}
            Status::Busy => return Ok(WriteOutcome::WouldBlock),
        }

        let dac_points: Vec<Point> = points.iter().map(|p| p.into()).collect();
        self.lib
            .write_points(self.card, &dac_points, pps, Repeat::ONCE)?;

        Ok(WriteOutcome::Written)
    }

    fn stop(&mut self) -> Result<()> {
        if self.connected {
            self.lib.stop(self.card)?;
        }
        Ok(())
    }
}

impl Drop for EtherDreamBackend {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            log::warn!("Failed to close Ether Dream card {}: {}", self.card, e);
        }
    }
}
