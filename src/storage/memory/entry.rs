//! Entry state shared by one writer and any number of cursors.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::trace;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{AccessTimes, EntryReader, EntryWriter};

/// Owns an entry's bytes and the single lock over them.
///
/// Handles hold an `Arc` to this record; the index holds another. Dropping
/// the index's reference never invalidates a handle.
pub(crate) struct MemoryEntry {
    name: String,
    data: Mutex<Vec<u8>>,
    closed: AtomicBool,
    aborted: AtomicBool,
    changed: Notify,
    created_at: DateTime<Utc>,
    last_read: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryEntry {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
            changed: Notify::new(),
            created_at: Utc::now(),
            last_read: Mutex::new(None),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, bytes: &[u8]) -> usize {
        if bytes.is_empty() {
            return 0;
        }
        {
            let mut data = self.data.lock();
            data.extend_from_slice(bytes);
        }
        self.changed.notify_waiters();
        bytes.len()
    }

    fn len(&self) -> u64 {
        self.data.lock().len() as u64
    }

    /// Copies committed bytes starting at `offset` into `buf` under the lock.
    fn copy_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        let data = self.data.lock();
        let Ok(start) = usize::try_from(offset) else {
            return 0;
        };
        if start >= data.len() {
            return 0;
        }
        let n = (data.len() - start).min(buf.len());
        buf[..n].copy_from_slice(&data[start..start + n]);
        n
    }

    /// Marks the writer closed. Returns `false` if it already was.
    fn close(&self) -> bool {
        // Release pairs with the Acquire in `is_closed`: a reader that sees the
        // flag also sees every append that preceded it.
        let was_closed = self.closed.swap(true, Ordering::AcqRel);
        if !was_closed {
            self.changed.notify_waiters();
        }
        !was_closed
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Marks the entry aborted, then closes it. Returns `false` if it was already closed.
    fn abort(&self) -> bool {
        if self.is_closed() {
            return false;
        }
        // Stored before the close flag so anyone who sees `closed` sees this too.
        self.aborted.store(true, Ordering::Release);
        self.close()
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    pub(crate) fn touch(&self) {
        *self.last_read.lock() = Some(Utc::now());
    }

    pub(crate) fn access_times(&self) -> AccessTimes {
        AccessTimes {
            last_read: *self.last_read.lock(),
            last_write: self.created_at,
        }
    }
}

impl fmt::Debug for MemoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEntry")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// The only writer of a [`MemoryEntry`].
///
/// Dropping it without [`close`](EntryWriter::close) aborts the entry.
pub struct MemoryWriter {
    entry: Arc<MemoryEntry>,
    written: u64,
}

impl MemoryWriter {
    pub(crate) fn new(entry: Arc<MemoryEntry>) -> Self {
        Self { entry, written: 0 }
    }

    /// Bytes appended through this writer so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl EntryWriter for MemoryWriter {
    fn name(&self) -> &str {
        self.entry.name()
    }

    fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        if self.entry.is_closed() {
            return Err(StorageError::WriterClosed {
                key: self.entry.name().to_string(),
            });
        }
        let n = self.entry.append(data);
        self.written += n as u64;
        Ok(n)
    }

    fn close(&mut self) {
        if self.entry.close() {
            trace!(key = %self.entry.name(), bytes = self.written, "entry writer closed");
        }
    }

    fn abort(&mut self) {
        if self.entry.abort() {
            trace!(key = %self.entry.name(), bytes = self.written, "entry writer aborted");
        }
    }

    fn is_closed(&self) -> bool {
        self.entry.is_closed()
    }
}

impl fmt::Debug for MemoryWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MemoryWriter(name={}, written={}, closed={})",
            self.entry.name(),
            self.written,
            self.entry.is_closed()
        )
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Independent cursor over a [`MemoryEntry`]; owns only its position.
pub struct MemoryReader {
    entry: Arc<MemoryEntry>,
    pos: u64,
}

impl MemoryReader {
    pub(crate) fn new(entry: Arc<MemoryEntry>) -> Self {
        Self { entry, pos: 0 }
    }
}

impl EntryReader for MemoryReader {
    fn name(&self) -> &str {
        self.entry.name()
    }

    fn read(&mut self, buf: &mut [u8]) -> StorageResult<usize> {
        let n = self.entry.copy_at(self.pos, buf);
        self.pos += n as u64;
        Ok(n)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> StorageResult<usize> {
        Ok(self.entry.copy_at(offset, buf))
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn len(&self) -> u64 {
        self.entry.len()
    }

    fn is_complete(&self) -> bool {
        self.entry.is_closed()
    }

    fn is_aborted(&self) -> bool {
        self.entry.is_aborted()
    }

    async fn wait_readable(&self) {
        let notified = self.entry.changed.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.entry.len() > self.pos || self.entry.is_closed() {
            return;
        }
        notified.await;
    }
}

impl fmt::Debug for MemoryReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MemoryReader(name={}, pos={}, complete={})",
            self.entry.name(),
            self.pos,
            self.entry.is_closed()
        )
    }
}
