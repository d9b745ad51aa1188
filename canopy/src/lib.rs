//! # Canopy
//!
//! Diffable forest snapshots and animated reconciliation for outline views.
//!
//! Describe the tree an outline control should show as a [`ForestSnapshot`],
//! hand it to a [`Driver`], and the driver works out the removals, moves and
//! insertions that take the view from what it shows now to what you asked
//! for, issuing them as one batch the view can animate.
//!
//! ## Usage
//!
//! ```
//! use canopy::{ApplyOutcome, Driver, OutlineModel};
//!
//! let mut driver = Driver::new(OutlineModel::<&'static str>::new());
//!
//! let mut snapshot = driver.snapshot();
//! snapshot.append_items(["inbox", "archive"], None)?;
//! snapshot.append_items(["2024"], Some(&"archive"))?;
//! driver.apply(snapshot, true, |_| {});
//!
//! let mut snapshot = driver.snapshot();
//! snapshot.move_item_into(&"2024", &"inbox")?;
//! let outcome = driver.apply(snapshot, true, |_| {});
//!
//! let ApplyOutcome::Animated(stats) = outcome else {
//!     panic!("expected an animated transition");
//! };
//! assert_eq!(stats.moved, 1);
//! # Ok::<(), canopy::SnapshotError>(())
//! ```
//!
//! ## Threading
//!
//! The driver belongs to the thread that created it and asserts so on every
//! call. Other threads fetch copies of the live snapshot through a
//! [`SnapshotReader`].

mod tracing_macros;

mod config;
mod driver;
mod dump;
mod error;
mod flatten;
mod item;
mod outline;
mod reader;
mod snapshot;
mod view;

pub use config::ReconcileConfig;
pub use driver::{ApplyOutcome, Driver, DriverState, ReloadReason};
pub use dump::SnapshotDump;
pub use error::{ReadError, SnapshotError};
pub use flatten::flatten;
pub use item::Item;
pub use outline::{OutlineModel, ViewCall};
pub use reader::SnapshotReader;
pub use snapshot::ForestSnapshot;
pub use view::OutlineView;

// Re-export the engine types that appear in this crate's API
pub use gumleaf::{DiffStats, Entry, Path};
