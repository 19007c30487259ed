use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt, stream};
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tracing::{debug, warn};

use crate::{
    dto::{game::GameView, sse::ServerEvent},
    services::round_service,
    state::SharedState,
};

const EVENT_SNAPSHOT: &str = "snapshot";
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Open the event stream for one UI client.
///
/// The stream starts with a `snapshot` of the session so a reloaded page can resync, then
/// forwards every broadcast event. A client that falls behind skips what it missed.
pub async fn open_stream(
    state: SharedState,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // subscribe first so nothing published while the view is built is lost
    let receiver = state.sse().subscribe();
    let snapshot = snapshot_event(&round_service::current_view(&state).await);

    let updates = BroadcastStream::new(receiver).filter_map(|received| async move {
        match received {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                debug!(skipped, "SSE subscriber lagged; skipping events");
                None
            }
        }
    });
    let events = stream::iter(snapshot)
        .chain(updates)
        .map(|event| Ok(to_event(event)));

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

fn snapshot_event(view: &GameView) -> Option<ServerEvent> {
    ServerEvent::json(Some(EVENT_SNAPSHOT.to_string()), view)
        .inspect_err(|err| warn!(error = %err, "failed to serialize session snapshot"))
        .ok()
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;
    use crate::services::{
        round_service::tests::{app, track},
        sse_events,
    };

    async fn next_frame<S>(body: &mut S) -> String
    where
        S: Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
    {
        let bytes = body.next().await.unwrap().unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn stream_opens_with_snapshot_then_forwards_events() {
        let (state, _device) = app(vec![track("a", 1968)]);

        let response = open_stream(state.clone()).await.into_response();
        let mut body = response.into_body().into_data_stream();

        let first = next_frame(&mut body).await;
        assert!(first.contains("event: snapshot"));
        assert!(first.contains(r#""phase":"setup""#));

        sse_events::broadcast_info(&state, "waiting for the playback device");
        let second = next_frame(&mut body).await;
        assert!(second.contains("event: info"));
        assert!(second.contains("waiting for the playback device"));
    }
}
