//! Local booking store.
//!
//! Stands in for the remote booking collaborator: bookings live in a JSON
//! Lines file, one per line. The scheduling engine only ever receives the
//! loaded list; writing is the caller's decision.

use crate::{jsonl, Booking, Result};
use std::path::{Path, PathBuf};

/// Source and sink of bookings
pub trait BookingStore {
    fn list(&self) -> Result<Vec<Booking>>;
    fn append(&mut self, booking: &Booking) -> Result<()>;
}

/// JSONL-backed booking store with file locking
pub struct JsonlBookingStore {
    path: PathBuf,
}

impl JsonlBookingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BookingStore for JsonlBookingStore {
    fn list(&self) -> Result<Vec<Booking>> {
        jsonl::read_records(&self.path)
    }

    fn append(&mut self, booking: &Booking) -> Result<()> {
        jsonl::append_record(&self.path, booking)?;
        tracing::debug!("Appended booking {} to {:?}", booking.id, self.path);
        Ok(())
    }
}
