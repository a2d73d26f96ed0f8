use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::stream::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/hotels/{hotel_id}/events/stream", get(hotel_events))
}

/// GET /v1/hotels/{hotel_id}/events/stream
///
/// Live lifecycle events for one hotel. Lagging clients silently skip
/// the events they missed.
async fn hotel_events(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.hotel_id() == hotel_id => Event::default()
                .event(event.kind())
                .json_data(&event)
                .ok()
                .map(Ok),
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
