use std::future::Future;

use chrono::{DateTime, Utc};

use super::error::StorageResult;

/// Last-read and last-write-start instants of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessTimes {
    /// Set by every `open`; `None` until the entry is first opened.
    pub last_read: Option<DateTime<Utc>>,
    /// When the entry was created (its writer started).
    pub last_write: DateTime<Utc>,
}

/// Append side of an entry. Exactly one exists per entry.
pub trait EntryWriter: Send {
    /// Name (key) of the entry this writer is bound to.
    fn name(&self) -> &str;

    /// Appends `data` as one indivisible unit and returns the number of bytes appended.
    ///
    /// An empty slice is a successful no-op. Fails with
    /// [`StorageError::WriterClosed`](super::StorageError::WriterClosed) after [`close`](Self::close).
    fn write(&mut self, data: &[u8]) -> StorageResult<usize>;

    /// Stops further appends. Content stays readable. Idempotent.
    fn close(&mut self);

    /// Closes the writer and marks the entry as incomplete.
    ///
    /// Committed bytes stay readable; cursors report
    /// [`is_aborted`](EntryReader::is_aborted). No-op if already closed.
    fn abort(&mut self);

    /// Returns `true` once [`close`](Self::close) or [`abort`](Self::abort) has been called.
    fn is_closed(&self) -> bool;
}

/// Cursor over an entry's committed bytes.
///
/// Reads never wait for the writer: they copy whatever is committed at the
/// moment of the call. `Ok(0)` for a non-empty buffer means end-of-data for
/// now; it is permanent only if [`is_complete`](Self::is_complete) was already
/// `true` before the read.
pub trait EntryReader: Send + Sync {
    /// Name (key) of the entry this cursor reads.
    fn name(&self) -> &str;

    /// Reads from the cursor's position and advances it by the bytes returned.
    fn read(&mut self, buf: &mut [u8]) -> StorageResult<usize>;

    /// Reads from an absolute `offset`, leaving the cursor's position untouched.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> StorageResult<usize>;

    /// Current cursor position.
    fn position(&self) -> u64;

    /// Committed length of the entry at the moment of the call.
    fn len(&self) -> u64;

    /// Returns `true` if nothing has been committed yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the entry's writer has closed (cleanly or not).
    fn is_complete(&self) -> bool;

    /// Returns `true` if the writer aborted instead of closing cleanly.
    ///
    /// Visible to any caller that has observed [`is_complete`](Self::is_complete).
    fn is_aborted(&self) -> bool;

    /// Resolves once bytes past [`position`](Self::position) are committed or the writer closes.
    fn wait_readable(&self) -> impl Future<Output = ()> + Send;
}
