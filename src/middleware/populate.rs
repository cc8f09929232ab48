use axum::BoxError;
use axum::body::{Bytes, HttpBody};
use http_body_util::BodyExt;

use super::error::PopulateError;
use crate::storage::EntryWriter;

/// Appends every data frame of `body` to `writer` and returns the byte count.
///
/// Trailers are dropped. The writer is left open; closing it is the caller's job.
pub(crate) async fn fill_entry<B, W>(body: B, writer: &mut W) -> Result<u64, PopulateError>
where
    B: HttpBody<Data = Bytes>,
    B::Error: Into<BoxError>,
    W: EntryWriter,
{
    let mut body = std::pin::pin!(body);
    let mut written = 0u64;

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| PopulateError::Body(e.into()))?;
        if let Ok(data) = frame.into_data() {
            written += writer.write(&data)? as u64;
        }
    }

    Ok(written)
}
