//! Cross-thread snapshot reads.
//!
//! The live snapshot belongs to the driver's owning thread. Other threads get
//! a copy by sending a request and blocking until the owning thread answers
//! it from [`Driver::serve_reads`](crate::Driver::serve_reads) or at the end
//! of an `apply`.

use std::sync::mpsc;
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::error::ReadError;
use crate::item::Item;
use crate::snapshot::ForestSnapshot;

/// A pending read: the channel the copy goes back on.
pub(crate) type ReadRequest<I> = mpsc::Sender<ForestSnapshot<I>>;

/// A handle for fetching the live snapshot from another thread.
///
/// Obtained from [`Driver::reader`](crate::Driver::reader). Cheap to clone.
pub struct SnapshotReader<I: Item> {
    requests: mpsc::Sender<ReadRequest<I>>,
    owner: ThreadId,
}

impl<I: Item> Clone for SnapshotReader<I> {
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
            owner: self.owner,
        }
    }
}

impl<I: Item> SnapshotReader<I> {
    pub(crate) fn new(requests: mpsc::Sender<ReadRequest<I>>, owner: ThreadId) -> Self {
        Self { requests, owner }
    }

    /// Block until the owning thread hands over a copy of the live snapshot.
    ///
    /// # Panics
    ///
    /// When called on the driver's owning thread, which could never serve it.
    pub fn snapshot(&self) -> Result<ForestSnapshot<I>, ReadError> {
        let reply = self.request()?;
        reply.recv().map_err(|_| ReadError::DriverGone)
    }

    /// Like [`snapshot`](Self::snapshot), giving up after `timeout`.
    pub fn snapshot_timeout(&self, timeout: Duration) -> Result<ForestSnapshot<I>, ReadError> {
        let reply = self.request()?;
        reply.recv_timeout(timeout).map_err(|err| match err {
            mpsc::RecvTimeoutError::Timeout => ReadError::TimedOut,
            mpsc::RecvTimeoutError::Disconnected => ReadError::DriverGone,
        })
    }

    fn request(&self) -> Result<mpsc::Receiver<ForestSnapshot<I>>, ReadError> {
        assert_ne!(
            thread::current().id(),
            self.owner,
            "SnapshotReader used on the driver's own thread; call Driver::snapshot instead"
        );
        let (reply_tx, reply_rx) = mpsc::channel();
        self.requests
            .send(reply_tx)
            .map_err(|_| ReadError::DriverGone)?;
        Ok(reply_rx)
    }
}
