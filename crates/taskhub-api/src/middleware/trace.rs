//! Request tracing.
//!
//! Spans record the path only. The query string can carry a bearer token
//! (`/ws?token=...`) and must not reach the logs.

use axum::body::Body;
use axum::http::{Request, Uri};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::Span;

/// Span factory type used by [`build_trace_layer`].
pub type MakeRequestSpan = fn(&Request<Body>) -> Span;

/// `TraceLayer` whose spans carry the method and path.
pub fn build_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeRequestSpan> {
    TraceLayer::new_for_http().make_span_with(request_span as MakeRequestSpan)
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %logged_path(request.uri()),
    )
}

fn logged_path(uri: &Uri) -> &str {
    uri.path()
}
