//! Snapshot validation and read errors.

use facet::Facet;

/// Why a snapshot mutation was rejected.
///
/// A rejected mutation leaves the snapshot exactly as it was. Ids are
/// rendered with their `Debug` representation.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum SnapshotError {
    /// item {id} is already in the snapshot
    DuplicateItem { id: String },

    /// item {id} is listed more than once
    RepeatedItem { id: String },

    /// item {id} not found
    ItemNotFound { id: String },

    /// parent {id} not found
    ParentNotFound { id: String },

    /// target {id} not found
    TargetNotFound { id: String },

    /// cannot move {id} relative to itself
    MoveOntoSelf { id: String },

    /// cannot move {id} next to or into its descendant {target}
    MoveIntoDescendant { id: String, target: String },
}

impl SnapshotError {
    pub(crate) fn render(id: &impl core::fmt::Debug) -> String {
        format!("{id:?}")
    }
}

/// Why a [`SnapshotReader`](crate::SnapshotReader) could not fetch a snapshot.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum ReadError {
    /// the driver was dropped
    DriverGone,

    /// the owning thread did not serve the read in time
    TimedOut,
}
