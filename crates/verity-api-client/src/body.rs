//! Progress-reporting request body.
//!
//! reqwest has no upload progress callback, so the file part is sent as a stream of
//! chunks. Each chunk is counted when the HTTP stack pulls it, which tracks the bytes
//! handed to the connection.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use verity_core::ProgressSink;

/// Split `data` into `chunk_size` slices (sharing the same buffer) and report the
/// cumulative byte count as each slice is consumed.
pub fn progress_stream(
    data: Bytes,
    chunk_size: usize,
    progress: ProgressSink,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total = data.len() as u64;
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect();

    let mut sent = 0u64;
    stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        progress.report(sent, total);
        Ok::<_, std::io::Error>(chunk)
    })
}
