//! Live relay of an entry to a caller.
//!
//! The relay keeps reading until the entry's writer has closed and every
//! committed byte has been sent, so a caller attached to an in-flight
//! population receives the full body. Between empty reads it waits on
//! [`EntryReader::wait_readable`] instead of spinning.
//!
//! An aborted entry ends the body with an error after its committed bytes,
//! so the caller sees a failed response rather than a short one.

use axum::body::{Body, Bytes};
use futures_util::stream;
use tracing::{debug, trace};

use crate::storage::{EntryReader, StorageError, StorageResult};

/// Streams `reader` from its current position as a response body.
pub(crate) fn relay_body<R>(reader: R, chunk_size: usize) -> Body
where
    R: EntryReader + 'static,
{
    let relay = Relay {
        reader,
        buf: vec![0; chunk_size.max(1)],
        sent: 0,
        done: false,
    };

    Body::from_stream(stream::unfold(relay, |mut relay| async move {
        let chunk = relay.next_chunk().await?;
        Some((chunk, relay))
    }))
}

struct Relay<R> {
    reader: R,
    buf: Vec<u8>,
    sent: u64,
    done: bool,
}

impl<R: EntryReader> Relay<R> {
    async fn next_chunk(&mut self) -> Option<StorageResult<Bytes>> {
        if self.done {
            return None;
        }

        loop {
            // Sample completion before reading: an empty read after the writer
            // closed is the real end of the entry.
            let complete = self.reader.is_complete();
            match self.reader.read(&mut self.buf) {
                Ok(0) if complete => {
                    self.done = true;
                    if self.reader.is_aborted() {
                        debug!(key = %self.reader.name(), bytes = self.sent, "relay reached an aborted entry");
                        return Some(Err(StorageError::Aborted {
                            key: self.reader.name().to_string(),
                        }));
                    }
                    trace!(key = %self.reader.name(), bytes = self.sent, "relay finished");
                    return None;
                }
                Ok(0) => self.reader.wait_readable().await,
                Ok(n) => {
                    self.sent += n as u64;
                    return Some(Ok(Bytes::copy_from_slice(&self.buf[..n])));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
