//! Server-Sent Events stream of store changes.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::Stream;
use tokio::sync::broadcast::error::RecvError;

use super::current_revision;
use crate::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// GET /api/events - Change events as they happen.
///
/// Emits `connected` once, then one `change` event per write. A subscriber
/// that falls behind gets a `lagged` event carrying the number of dropped
/// events and should refetch.
pub async fn change_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.store.events().subscribe();
    let revision_id = current_revision(&state).await;
    tracing::debug!(
        "Change stream opened at revision {} ({} subscribers)",
        revision_id,
        state.store.events().subscriber_count()
    );

    let stream = async_stream::stream! {
        yield Ok::<_, Infallible>(Event::default()
            .event("connected")
            .data(revision_id.to_string()));

        loop {
            match receiver.recv().await {
                Ok(change) => {
                    let event = Event::default()
                        .event("change")
                        .id(change.revision_id.to_string());
                    match event.json_data(&change) {
                        Ok(event) => yield Ok(event),
                        Err(e) => tracing::error!("Failed to encode change event: {}", e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Change stream lagged, {} events dropped", skipped);
                    yield Ok(Event::default().event("lagged").data(skipped.to_string()));
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("Change stream closed");
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
