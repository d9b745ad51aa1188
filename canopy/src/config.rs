//! Reconciliation tuning.

use facet::Facet;

/// Configuration for the [`Driver`](crate::Driver).
///
/// Hosts can load it from JSON; missing fields take their default.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
#[facet(default)]
pub struct ReconcileConfig {
    /// Largest number of row changes (inserts + removes + moves) still
    /// worth animating. Bigger transitions fall back to a full reload.
    pub max_animated_edits: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_animated_edits: 1000,
        }
    }
}
