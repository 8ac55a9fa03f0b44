use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use rand::Rng;
use std::time::Duration;

/// Failure profile of the simulated backend: every request is delayed inside
/// the latency window, and mutating requests fail with a 500 at
/// `failure_rate`. Failures are injected before the handler runs, so a failed
/// write has no partial effect on the store.
#[derive(Debug, Clone, Copy)]
pub struct ChaosConfig {
    pub failure_rate: f64,
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.075,
            latency_min_ms: 200,
            latency_max_ms: 1200,
        }
    }
}

impl ChaosConfig {
    pub fn disabled() -> Self {
        Self {
            failure_rate: 0.0,
            latency_min_ms: 0,
            latency_max_ms: 0,
        }
    }

    pub fn always_failing() -> Self {
        Self {
            failure_rate: 1.0,
            latency_min_ms: 0,
            latency_max_ms: 0,
        }
    }
}

pub async fn chaos_middleware(
    State(chaos): State<ChaosConfig>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if chaos.latency_max_ms > 0 {
        let delay = rand::thread_rng().gen_range(chaos.latency_min_ms..=chaos.latency_max_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let mutating = matches!(req.method().as_str(), "POST" | "PATCH" | "PUT" | "DELETE");
    if mutating
        && chaos.failure_rate > 0.0
        && rand::thread_rng().gen_bool(chaos.failure_rate.clamp(0.0, 1.0))
    {
        tracing::debug!(method = %req.method(), uri = %req.uri(), "injected simulated failure");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(serde_json::json!({ "error": "Internal Server Error" })),
        )
            .into_response();
    }

    next.run(req).await
}
