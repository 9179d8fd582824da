use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    response::Response,
};
use opentelemetry::{
    global,
    trace::{SpanKind, TraceContextExt, Tracer},
    Context, KeyValue,
};
use opentelemetry_otlp::tonic_types::metadata::MetadataMap;
use opentelemetry_otlp::{WithExportConfig, WithTonicConfig};
use std::{
    future::Future,
    pin::Pin,
    sync::OnceLock,
    task::{Context as TaskContext, Poll},
};
use tower::{Layer, Service};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::auth::jwt::Claims;
use crate::config::env_value;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// gRPC metadata key carrying `OTEL_INGESTION_KEY` unless
/// `OTEL_INGESTION_HEADER` names another.
const DEFAULT_INGESTION_HEADER: &str = "x-otel-ingestion-key";

/// Keep the TracerProvider alive for the process lifetime so it can be flushed.
static TRACER_PROVIDER: OnceLock<opentelemetry_sdk::trace::SdkTracerProvider> = OnceLock::new();

/// Install the `tracing` subscriber: human-readable fmt output filtered by
/// `RUST_LOG` (default `info` for this crate, `warn` for dependencies).
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,server=info,tower_http=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Set up the OpenTelemetry TracerProvider and register it globally.
///
/// Only configures the OTLP trace exporter so HTTP spans (via
/// `OtelTraceLayer`) reach the collector. Must run inside a Tokio runtime.
///
/// Reads config from environment:
///   - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector gRPC address, e.g. `http://localhost:4317`
///   - `OTEL_SERVICE_NAME`: service name tag (default: `counseling-intake`)
///   - `OTEL_INGESTION_KEY`: access token sent as gRPC metadata (optional)
///   - `OTEL_INGESTION_HEADER`: metadata key for that token (default: `x-otel-ingestion-key`)
///   - `DEPLOY_ENV`: deployment environment tag (default: `development`)
pub fn init_telemetry() {
    let Some(endpoint) = env_value("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        tracing::info!("OTEL_EXPORTER_OTLP_ENDPOINT not set, skipping OTLP telemetry");
        return;
    };

    let service_name =
        env_value("OTEL_SERVICE_NAME").unwrap_or_else(|| "counseling-intake".to_string());
    let environment = env_value("DEPLOY_ENV").unwrap_or_else(|| "development".to_string());

    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint);

    // TLS with system roots for HTTPS collectors
    if endpoint.starts_with("https://") {
        builder = builder.with_tls_config(
            opentelemetry_otlp::tonic_types::transport::ClientTlsConfig::new().with_native_roots(),
        );
    }

    if let Some(key) = env_value("OTEL_INGESTION_KEY") {
        let header = env_value("OTEL_INGESTION_HEADER")
            .unwrap_or_else(|| DEFAULT_INGESTION_HEADER.to_string());
        match ingestion_metadata(&header, &key) {
            Some(metadata) => builder = builder.with_metadata(metadata),
            None => tracing::warn!(
                header = %header,
                "OTEL_INGESTION_HEADER or OTEL_INGESTION_KEY is not a valid gRPC header; ignoring"
            ),
        }
    }

    let exporter = match builder.build() {
        Ok(exporter) => exporter,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create OTLP exporter; telemetry disabled");
            return;
        }
    };

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name)
        .with_attribute(KeyValue::new("service.version", APP_VERSION))
        .with_attribute(KeyValue::new("deployment.environment", environment))
        .build();

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build();

    global::set_tracer_provider(provider.clone());
    let _ = TRACER_PROVIDER.set(provider);

    tracing::info!(endpoint = %endpoint, version = APP_VERSION, "Telemetry initialized; traces exporting");
}

/// Build the collector auth metadata. `None` when either part is not a
/// valid ASCII gRPC header.
fn ingestion_metadata(header: &str, key: &str) -> Option<MetadataMap> {
    let name = HeaderName::from_bytes(header.trim().as_bytes()).ok()?;
    let value = HeaderValue::from_str(key).ok()?;
    let mut headers = HeaderMap::new();
    headers.insert(name, value);
    Some(MetadataMap::from_headers(headers))
}

/// Flush pending spans. Call before the process exits.
pub fn shutdown_telemetry() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "Telemetry shutdown reported an error");
        }
    }
}

/// Detect client platform from User-Agent and optional X-Client-Platform header.
///
/// Priority: explicit `X-Client-Platform` header > User-Agent heuristic.
/// Clients without a User-Agent (the headless admin client, scripts) show
/// as "native" unless they send X-Client-Platform.
fn detect_platform(ua: &str, explicit: Option<&str>) -> &'static str {
    if let Some(p) = explicit {
        return match p {
            "ios" => "ios",
            "android" => "android",
            "desktop" => "desktop",
            "mobile" => "mobile",
            "web" => "web",
            _ => "unknown",
        };
    }

    if ua == "unknown" || ua.is_empty() {
        return "native";
    }
    if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("CFNetwork") {
        "ios"
    } else if ua.contains("Android") {
        "android"
    } else if ua.contains("Mozilla") || ua.contains("Chrome") || ua.contains("Safari") {
        "web"
    } else {
        "native"
    }
}

/// Collapse UUID path segments so span names stay low-cardinality:
/// `/api/admin/student/records/<uuid>/status` becomes
/// `/api/admin/student/records/{id}/status`.
fn route_template(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if uuid::Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Tower layer that creates an OpenTelemetry span for each HTTP request.
///
/// Captures: method, path, user-agent, client platform, request ID,
/// response status, and the signed-in administrator (if any).
#[derive(Clone)]
pub struct OtelTraceLayer;

impl<S> Layer<S> for OtelTraceLayer {
    type Service = OtelTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OtelTraceService { inner }
    }
}

#[derive(Clone)]
pub struct OtelTraceService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for OtelTraceService<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let tracer = global::tracer("counseling-intake");
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let explicit_platform = req
            .headers()
            .get("x-client-platform")
            .and_then(|v| v.to_str().ok());
        let client_platform = detect_platform(&user_agent, explicit_platform);

        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let auth_attrs: Vec<KeyValue> = if let Some(claims) = req.extensions().get::<Claims>() {
            vec![
                KeyValue::new("admin.id", claims.sub),
                KeyValue::new("admin.role", claims.role.clone()),
                KeyValue::new("auth.status", "authenticated"),
            ]
        } else {
            vec![KeyValue::new("auth.status", "anonymous")]
        };

        let mut attributes = vec![
            KeyValue::new("http.method", method.clone()),
            KeyValue::new("http.target", path.clone()),
            KeyValue::new("http.user_agent", user_agent),
            KeyValue::new("client.platform", client_platform),
            KeyValue::new("http.request_id", request_id),
        ];
        attributes.extend(auth_attrs);

        let route = route_template(&path);

        let span = tracer
            .span_builder(format!("{} {}", &method, &route))
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        let cx = Context::current_with_span(span);
        let mut inner = self.inner.clone();

        let guard = cx.clone().attach();
        let future = inner.call(req);
        drop(guard);

        Box::pin(async move {
            let response = future.await?;

            let span = cx.span();
            let status = response.status();
            span.set_attribute(KeyValue::new("http.status_code", status.as_u16() as i64));

            if status.is_server_error() {
                span.set_status(opentelemetry::trace::Status::error(status.to_string()));
            } else if status.is_client_error() {
                span.set_attribute(KeyValue::new("error.type", "client_error"));
            }

            Ok(response)
        })
    }
}
