//! Byte-progress accounting for streamed upload bodies.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;

/// A single progress emission for an in-flight transfer.
///
/// `progress` is an integer percentage in `0..=100` and never decreases within
/// one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub progress: u8,
}

/// Callback invoked as payload bytes are handed to the transport.
pub type ProgressFn = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// How much of the payload goes out per body chunk.
pub(crate) const CHUNK_SIZE: usize = 64 * 1024;

/// Integer percentage of `sent` over `total`, rounded half-up and clamped to 100.
pub(crate) fn percent_of(sent: u64, total: u64) -> u8 {
    (((sent as f64 / total as f64) * 100.0).round() as u64).min(100) as u8
}

/// Wrap a payload in a chunked stream that reports cumulative progress.
///
/// Progress is only reported while the total size is known and non-zero; the
/// callback fires after each chunk is yielded to the transport.
pub(crate) fn progress_stream(
    payload: Bytes,
    on_progress: Option<ProgressFn>,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let total = payload.len() as u64;

    futures::stream::unfold((payload, 0u64), move |(mut remaining, sent)| {
        let on_progress = on_progress.clone();
        async move {
            if remaining.is_empty() {
                return None;
            }

            let take = remaining.len().min(CHUNK_SIZE);
            let chunk = remaining.split_to(take);
            let sent = sent + take as u64;

            if total > 0 {
                if let Some(callback) = &on_progress {
                    callback(ProgressEvent {
                        progress: percent_of(sent, total),
                    });
                }
            }

            Some((Ok(chunk), (remaining, sent)))
        }
    })
}
