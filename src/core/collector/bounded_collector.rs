// Bounded-time subscription over a stream of user choices.
//
// Buttons on a message are only listened to for a fixed window. The caller
// registers interest (hands over a stream), receives choices until it says
// stop, the stream closes, or the deadline passes, and then runs its own
// finalize step once with the returned `CollectorEnd`.

use futures::{Stream, StreamExt};
use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Why a collector stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorEnd {
    /// The handler asked to stop.
    Stopped,
    /// The window elapsed.
    Deadline,
    /// The source closed before the window elapsed.
    Exhausted,
}

/// Feed items from `stream` to `on_item` until it breaks, the stream ends, or
/// `window` has passed since the call.
pub async fn collect_within<S, T, F, Fut>(stream: S, window: Duration, mut on_item: F) -> CollectorEnd
where
    S: Stream<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = ControlFlow<()>>,
{
    let deadline = Instant::now() + window;
    let mut stream = std::pin::pin!(stream);

    loop {
        match timeout_at(deadline, stream.next()).await {
            Err(_) => return CollectorEnd::Deadline,
            Ok(None) => return CollectorEnd::Exhausted,
            Ok(Some(item)) => {
                if on_item(item).await.is_break() {
                    return CollectorEnd::Stopped;
                }
            }
        }
    }
}

/// First item from `stream` within `window`, or `None` when nothing arrived.
pub async fn first_within<S, T>(stream: S, window: Duration) -> Option<T>
where
    S: Stream<Item = T>,
{
    let mut first = None;
    collect_within(stream, window, |item| {
        first = Some(item);
        async { ControlFlow::Break(()) }
    })
    .await;
    first
}
