use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Per-client-IP fixed window. Fails open when Redis is unreachable and
/// does nothing when no Redis is configured.
pub async fn rate_limit_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(redis) = state.redis.as_ref() else {
        return next.run(req).await;
    };

    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("ratelimit:{}", ip);

    match redis
        .check_rate_limit(&key, state.rate_limit.requests, state.rate_limit.window_seconds)
        .await
    {
        Ok(true) => next.run(req).await,
        Ok(false) => AppError::RateLimited.into_response(),
        Err(e) => {
            warn!("Rate limiter unavailable, allowing request: {}", e);
            next.run(req).await
        }
    }
}
