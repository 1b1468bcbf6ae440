//! Prometheus metrics middleware.
//!
//! Provides HTTP request/response metrics collection and export.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::ModelType;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

use crate::app::AppState;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Middleware to record HTTP request metrics.
///
/// Records the following metrics:
/// - `http_requests_total`: Counter with labels (method, path, status)
/// - `http_request_duration_seconds`: Histogram with labels (method, path)
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    // Route template, so ids do not explode label cardinality
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}

/// Convert HTTP method to string for metric labels.
fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Label value for a template's business model.
fn model_type_label(model_type: Option<ModelType>) -> &'static str {
    model_type.map_or("none", |m| m.as_str())
}

/// Counts a stored submission, labelled by the template's business model.
pub fn record_submission_created(model_type: Option<ModelType>) {
    counter!(
        "submissions_created_total",
        "model_type" => model_type_label(model_type)
    )
    .increment(1);
}

/// Counts a template created or recomposed, with the composed question count.
pub fn record_template_composed(question_count: usize) {
    counter!("templates_composed_total").increment(1);
    histogram!("template_question_count").record(question_count as f64);
}

/// Counts a CSV export and the rows written.
pub fn record_export(rows: usize) {
    counter!("submission_exports_total").increment(1);
    counter!("submission_export_rows_total").increment(rows as u64);
}

/// Handler for /metrics endpoint that returns Prometheus text format.
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    persistence::metrics::record_pool_metrics(&state.pool);

    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized",
        )
            .into_response(),
    }
}

/// Installs the global Prometheus recorder.
///
/// Call once at startup, before any metrics are recorded. A second call is
/// a no-op.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    // Lost race: the recorder is installed either way
    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_to_str() {
        assert_eq!(method_to_str(&Method::GET), "GET");
        assert_eq!(method_to_str(&Method::POST), "POST");
        assert_eq!(method_to_str(&Method::PUT), "PUT");
        assert_eq!(method_to_str(&Method::DELETE), "DELETE");
        assert_eq!(method_to_str(&Method::PATCH), "PATCH");
    }

    #[test]
    fn test_method_to_str_other() {
        assert_eq!(method_to_str(&Method::TRACE), "OTHER");
    }

    #[test]
    fn test_model_type_label() {
        assert_eq!(model_type_label(None), "none");
        assert_eq!(model_type_label(Some(ModelType::Credito)), "credito");
        assert_eq!(model_type_label(Some(ModelType::Seguro)), "seguro");
    }

    #[test]
    fn test_business_counters_are_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_submission_created(Some(ModelType::Imobiliaria));
            record_submission_created(None);
            record_template_composed(12);
            record_export(3);
        });

        let output = handle.render();
        assert!(output.contains("submissions_created_total{model_type=\"imobiliaria\"} 1"));
        assert!(output.contains("submissions_created_total{model_type=\"none\"} 1"));
        assert!(output.contains("templates_composed_total 1"));
        assert!(output.contains("submission_export_rows_total 3"));
        assert!(!output.contains("template_id"));
    }
}
