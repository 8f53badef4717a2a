//! HTTP surface for the watch loop: a static viewer page, an SSE stream
//! of graph payloads, and a JSON snapshot route.

use super::broker::Broker;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

const VIEWER_PAGE: &str = include_str!("viewer.html");

pub fn router(broker: Arc<Broker>) -> Router {
    Router::new()
        .route("/", get(viewer))
        .route("/events", get(events))
        .route("/snapshot.json", get(snapshot))
        .with_state(broker)
}

async fn viewer() -> Html<&'static str> {
    Html(VIEWER_PAGE)
}

async fn snapshot(State(broker): State<Arc<Broker>>) -> impl IntoResponse {
    Json(broker.snapshot())
}

async fn events(
    State(broker): State<Arc<Broker>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = broker.subscribe();
    let stream = WatchStream::new(receiver).map(|payload| {
        let event = Event::default()
            .json_data(&payload)
            .unwrap_or_else(|_| Event::default().data("{}"));
        Ok(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_builds_with_an_empty_broker() {
        let broker = Arc::new(Broker::new());
        let _router = router(broker);
    }
}
