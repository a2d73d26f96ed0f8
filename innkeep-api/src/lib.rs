use axum::{http::Method, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod access;
pub mod error;
pub mod functions;
pub mod health;
pub mod inventory;
pub mod metrics;
pub mod middleware;
pub mod publisher;
pub mod reservations;
pub mod rooms;
pub mod state;
pub mod stream;
pub mod worker;

pub use error::AppError;
pub use metrics::Metrics;
pub use publisher::BroadcastPublisher;
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
            axum::http::HeaderName::from_static("apikey"),
            axum::http::HeaderName::from_static("x-client-info"),
        ]);

    Router::new()
        .merge(functions::routes())
        .merge(reservations::routes())
        .merge(rooms::routes())
        .merge(inventory::routes())
        .merge(access::routes())
        .merge(stream::routes())
        .merge(health::routes())
        .route("/metrics", get(metrics::metrics_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
