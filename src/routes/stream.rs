// Live scan log feed over server-sent events

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt, stream};
use tokio::sync::broadcast;

use super::AppState;

/// GET /stream — one event per scan log line, in emission order. A client
/// only sees lines emitted after it attached. A slow client that overflows
/// its buffer gets a notice and keeps receiving; it is never disconnected
/// for lagging. An idle stream carries keep-alive comments so proxies do
/// not cut the connection.
pub(super) async fn stream_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let lines = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(line) => Some((Event::default().data(line), rx)),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("stream client lagged, skipped {} lines", n);
                Some((
                    Event::default().data(format!("[stream lagged, {} lines dropped]", n)),
                    rx,
                ))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    })
    .map(Ok);

    Sse::new(lines).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_millis(state.config.stream.keepalive_ms))
            .text("keep-alive"),
    )
}
