//! The reconciliation driver.
//!
//! Owns the live snapshot and the view. Each `apply` diffs the live snapshot
//! against the submitted one and replays the result against the view inside
//! a single batch, or falls back to a full reload.

use crate::{debug, trace, warn};

use std::sync::mpsc;
use std::thread::{self, ThreadId};

use crate::config::ReconcileConfig;
use crate::flatten::flatten;
use crate::item::Item;
use crate::reader::{ReadRequest, SnapshotReader};
use crate::snapshot::ForestSnapshot;
use crate::view::OutlineView;
use gumleaf::{DiffStats, Edit, EditScript, Entry, diff, simplify_edit_script};
use rapidhash::RapidHashMap as HashMap;

/// Whether a transition is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No transition in progress
    Idle,
    /// A submitted snapshot is being replayed against the view
    Applying,
}

/// Why a transition was shown as a full reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The caller asked for no animation
    NotAnimated,
    /// The transition needed more row changes than the configured maximum
    TooManyEdits {
        /// Row changes the transition needed
        edits: usize,
    },
}

/// What an `apply` did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Same structure; at most some rows were re-rendered
    Unchanged,
    /// Incremental batch with these changes
    Animated(DiffStats),
    /// The view was reloaded wholesale
    Reloaded(ReloadReason),
}

/// Pure insertions under one parent, waiting to be issued together.
struct InsertRun<I: Item> {
    parent: Option<I::Id>,
    indexes: Vec<usize>,
    items: Vec<I>,
}

/// Keeps an [`OutlineView`] in sync with a sequence of submitted snapshots.
///
/// Confined to the thread that created it: every method asserts it runs
/// there. Other threads read through a [`SnapshotReader`].
pub struct Driver<I: Item, V: OutlineView<I>> {
    live: ForestSnapshot<I>,
    view: V,
    config: ReconcileConfig,
    state: DriverState,

    owner: ThreadId,
    requests: mpsc::Receiver<ReadRequest<I>>,
    request_tx: mpsc::Sender<ReadRequest<I>>,
}

impl<I: Item, V: OutlineView<I>> Driver<I, V> {
    /// Create a driver with an empty live snapshot, and reset `view` to match.
    pub fn new(view: V) -> Self {
        Self::with_config(view, ReconcileConfig::default())
    }

    /// Like [`new`](Self::new), with explicit configuration.
    pub fn with_config(mut view: V, config: ReconcileConfig) -> Self {
        let live = ForestSnapshot::new();
        view.reload_data(&live);
        let (request_tx, requests) = mpsc::channel();
        Self {
            live,
            view,
            config,
            state: DriverState::Idle,
            owner: thread::current().id(),
            requests,
            request_tx,
        }
    }

    /// Current state. Always [`DriverState::Idle`] between calls.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The active configuration.
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next `apply`.
    pub fn set_config(&mut self, config: ReconcileConfig) {
        self.assert_owner("set_config");
        self.config = config;
    }

    /// The driven view.
    pub fn view(&self) -> &V {
        self.assert_owner("view");
        &self.view
    }

    /// The driven view, mutably. Structural changes made through it are the
    /// caller's to keep consistent.
    pub fn view_mut(&mut self) -> &mut V {
        self.assert_owner("view_mut");
        &mut self.view
    }

    /// A copy of the live snapshot, to edit and submit back.
    pub fn snapshot(&self) -> ForestSnapshot<I> {
        self.assert_owner("snapshot");
        self.live.clone()
    }

    /// A handle other threads can fetch the live snapshot through.
    pub fn reader(&self) -> SnapshotReader<I> {
        SnapshotReader::new(self.request_tx.clone(), self.owner)
    }

    /// Answer every pending [`SnapshotReader`] request. Returns how many
    /// were served.
    pub fn serve_reads(&self) -> usize {
        self.assert_owner("serve_reads");
        let mut served = 0;
        while let Ok(reply) = self.requests.try_recv() {
            // The reader may have timed out and hung up
            let _ = reply.send(self.live.clone());
            served += 1;
        }
        if served > 0 {
            trace!(served, "served snapshot reads");
        }
        served
    }

    // ------------------------------------------------------------------
    // Lookups for the view's data source
    // ------------------------------------------------------------------

    /// Children of `parent` (root level for `None`) in the live snapshot.
    pub fn children_of(&self, parent: Option<&I::Id>) -> Vec<&I> {
        self.assert_owner("children_of");
        self.live.children_of(parent)
    }

    /// Number of children of `parent` in the live snapshot.
    pub fn child_count(&self, parent: Option<&I::Id>) -> usize {
        self.assert_owner("child_count");
        self.live.child_count(parent)
    }

    /// Parent of an item in the live snapshot.
    pub fn parent_of(&self, id: &I::Id) -> Option<I::Id> {
        self.assert_owner("parent_of");
        self.live.parent_of(id)
    }

    /// Position of an item among its siblings in the live snapshot.
    pub fn index_of(&self, id: &I::Id) -> Option<usize> {
        self.assert_owner("index_of");
        self.live.index_of(id)
    }

    /// Item with this id in the live snapshot.
    pub fn item(&self, id: &I::Id) -> Option<&I> {
        self.assert_owner("item");
        self.live.item(id)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Make `new` the live snapshot and bring the view along.
    ///
    /// With `animated`, the view receives one batch of removals, moves and
    /// insertions, followed by re-renders for the items `new` marked for
    /// reload. Without it, or when the transition is larger than
    /// [`ReconcileConfig::max_animated_edits`], the view reloads wholesale.
    ///
    /// `completion` runs exactly once, after the batch is closed and the
    /// driver is idle again. The outcome is also returned.
    pub fn apply(
        &mut self,
        new: ForestSnapshot<I>,
        animated: bool,
        completion: impl FnOnce(ApplyOutcome),
    ) -> ApplyOutcome {
        self.assert_owner("apply");
        debug_assert_eq!(self.state, DriverState::Idle);

        self.state = DriverState::Applying;
        let outcome = if animated {
            self.animate(new)
        } else {
            self.reload(new, ReloadReason::NotAnimated)
        };
        self.state = DriverState::Idle;

        debug!(?outcome, items = self.live.len(), "apply done");
        self.serve_reads();
        completion(outcome);
        outcome
    }

    fn reload(&mut self, mut new: ForestSnapshot<I>, reason: ReloadReason) -> ApplyOutcome {
        // A full reload re-renders everything anyway
        new.flush_reloaded_items();
        self.live = new;
        self.view.reload_data(&self.live);
        ApplyOutcome::Reloaded(reason)
    }

    fn animate(&mut self, mut new: ForestSnapshot<I>) -> ApplyOutcome {
        let reloaded = new.flush_reloaded_items();

        let old_flat = flatten(&self.live);
        let new_flat = flatten(&new);
        let script = simplify_edit_script(diff(&old_flat, &new_flat));
        let stats = script.stats();
        debug!(%stats, "diffed snapshots");

        if stats.total() > self.config.max_animated_edits {
            debug!(
                edits = stats.total(),
                max = self.config.max_animated_edits,
                "too many edits, reloading"
            );
            return self.reload(
                new,
                ReloadReason::TooManyEdits {
                    edits: stats.total(),
                },
            );
        }

        // Freshly inserted rows render with their current payload already
        let reloaded: Vec<I> = reloaded
            .into_iter()
            .filter(|item| self.live.contains(&item.id()))
            .collect();

        let outcome = if script.is_empty() {
            ApplyOutcome::Unchanged
        } else {
            self.view.begin_updates();
            self.replay(&script, &old_flat, &new);
            self.view.end_updates();
            ApplyOutcome::Animated(stats)
        };

        self.live = new;
        if !reloaded.is_empty() {
            trace!(count = reloaded.len(), "reloading rows");
            self.view.reload_rows(&reloaded);
        }
        outcome
    }

    /// Issue the view calls for one script. `self.live` is still the old
    /// snapshot here.
    fn replay(&mut self, script: &EditScript<I::Id>, old_flat: &[Entry<I::Id>], new: &ForestSnapshot<I>) {
        // Removals, grouped per old parent, in old coordinates
        let mut groups: Vec<(Option<I::Id>, Vec<usize>)> = Vec::new();
        let mut group_of: HashMap<Option<I::Id>, usize> = HashMap::default();
        for edit in script.removals() {
            let Edit::Remove {
                parent,
                path,
                moved_to: None,
                ..
            } = edit
            else {
                continue;
            };
            let slot = *group_of.entry(parent.clone()).or_insert_with(|| {
                groups.push((parent.clone(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(path.index().unwrap_or(0));
        }
        for (parent, mut indexes) in groups {
            indexes.sort_unstable();
            let parent_item = lookup(&self.live, parent.as_ref());
            trace!(?parent, ?indexes, "remove_rows");
            self.view.remove_rows(&indexes, parent_item);
        }

        // Destinations, in new order: runs of insertions and single moves
        let mut run: Option<InsertRun<I>> = None;
        for edit in script.insertions() {
            let Edit::Insert {
                id,
                parent,
                path,
                moved_from,
                ..
            } = edit
            else {
                continue;
            };
            let index = path.index().unwrap_or(0);

            match moved_from {
                None => {
                    let Some(item) = new.item(id) else {
                        warn!(?id, "inserted item missing from the new snapshot");
                        continue;
                    };
                    match run.as_mut() {
                        Some(pending) if pending.parent == *parent => {
                            pending.indexes.push(index);
                            pending.items.push(item.clone());
                        }
                        _ => {
                            flush_run(&mut self.view, new, run.take());
                            run = Some(InsertRun {
                                parent: parent.clone(),
                                indexes: vec![index],
                                items: vec![item.clone()],
                            });
                        }
                    }
                }
                Some(from) => {
                    flush_run(&mut self.view, new, run.take());
                    let source = &old_flat[*from];
                    let from_parent = lookup(&self.live, source.parent.as_ref());
                    let to_parent = lookup(new, parent.as_ref());
                    trace!(?id, from = source.index(), to = index, "move_row");
                    self.view
                        .move_row(source.index(), from_parent, index, to_parent);
                }
            }
        }
        flush_run(&mut self.view, new, run);
    }

    fn assert_owner(&self, operation: &str) {
        assert_eq!(
            thread::current().id(),
            self.owner,
            "Driver::{operation} called off the driver's owning thread"
        );
    }
}

/// The item for a parent id, `None` meaning the root level.
fn lookup<'a, I: Item>(snapshot: &'a ForestSnapshot<I>, parent: Option<&I::Id>) -> Option<&'a I> {
    let id = parent?;
    let item = snapshot.item(id);
    if item.is_none() {
        warn!(?id, "parent item missing from snapshot");
    }
    item
}

fn flush_run<I: Item, V: OutlineView<I>>(view: &mut V, new: &ForestSnapshot<I>, run: Option<InsertRun<I>>) {
    let Some(run) = run else {
        return;
    };
    trace!(parent = ?run.parent, indexes = ?run.indexes, "insert_rows");
    view.insert_rows(&run.indexes, lookup(new, run.parent.as_ref()), &run.items);
}
