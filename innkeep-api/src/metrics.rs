use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::state::AppState;

pub struct Metrics {
    registry: Registry,
    transitions: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let transitions = IntCounterVec::new(
            Opts::new("innkeep_transitions_total", "Reservation lifecycle requests by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(transitions.clone()))?;

        Ok(Self { registry, transitions })
    }

    /// `outcome` is `"ok"` or a `FrontDeskError` code.
    pub fn record(&self, operation: &str, outcome: &str) {
        self.transitions.with_label_values(&[operation, outcome]).inc();
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_counter_is_exposed() {
        let metrics = Metrics::new().unwrap();
        metrics.record("check_in", "ok");
        metrics.record("check_in", "ok");
        metrics.record("check_out", "UnpaidBalance");

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"innkeep_transitions_total{operation="check_in",outcome="ok"} 2"#));
        assert!(text.contains(r#"innkeep_transitions_total{operation="check_out",outcome="UnpaidBalance"} 1"#));
    }
}
