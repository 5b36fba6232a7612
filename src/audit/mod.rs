//! Change history for auditable records
//!
//! Updates to defects and projects leave a trail of field-level
//! `HistoryEntry`s. This module only computes entries; persisting them is
//! the history store's job.
//!
//! # Example
//!
//! ```rust,ignore
//! use defect_tracker::audit::{diff, snapshot, EntityType};
//!
//! let before = snapshot(&defect)?;
//! let updates = defect_update.field_updates();
//! let entries = diff(
//!     EntityType::Defect,
//!     &before,
//!     &updates,
//!     Some(actor.id),
//!     Some(&defect.id.key()),
//!     now,
//! )?;
//! storage.history.put_all(entries)?;
//! ```

mod diff;
mod entry;

pub use diff::{diff, replay, snapshot, stringify, FieldUpdates, Snapshot};
pub use entry::{EntityType, HistoryEntry};
