//! Output collaborators of a simulation run.
//!
//! Loaders only need a [`Reporter`] for row-level warnings; the simulation
//! driver talks to a full [`InventoryView`].

mod recording;

pub use recording::{RecordingView, ViewEvent};

use crate::inventory::Item;
use crate::loaders::RowWarning;
use chrono::NaiveDate;

/// Sink for recoverable warnings and fatal errors.
pub trait Reporter: Send + Sync {
    fn warning(&self, warning: &RowWarning);

    fn error(&self, error: &dyn std::error::Error);
}

/// Receives the inventory after loading, every simulated day, and the end of
/// the run.
pub trait InventoryView: Reporter {
    fn inventory(&self, items: &[Item]);

    fn day(&self, day: NaiveDate, items: &[Item]);

    fn done(&self);
}
