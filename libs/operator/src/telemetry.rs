use crate::error::{Error, Result};

use clap::ValueEnum;
use opentelemetry::trace::{TraceContextExt, TraceId, TracerProvider as _};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider, Tracer};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const SERVICE_NAME: &str = "wpop";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

///  Fetch an opentelemetry::trace::TraceId as hex through the full tracing stack
pub fn get_trace_id() -> TraceId {
    tracing::Span::current()
        .context()
        .span()
        .span_context()
        .trace_id()
}

fn init_tracer(tracing_url: &str, sample_ratio: f64) -> Result<Tracer> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(tracing_url)
        .build()
        .map_err(Error::TracingExporterError)?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
            sample_ratio,
        ))))
        .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
        .build();
    let tracer = provider.tracer(SERVICE_NAME);
    opentelemetry::global::set_tracer_provider(provider);
    Ok(tracer)
}

/// Initialize tracing
pub async fn init(
    log_filter: &str,
    log_format: LogFormat,
    tracing_url: Option<&str>,
    sample_ratio: f64,
) -> Result<()> {
    let logger = match log_format {
        LogFormat::Text => tracing_subscriber::fmt::layer().compact().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };
    let env_filter = EnvFilter::try_new(log_filter).map_err(Error::LogFilterError)?;
    let otel = tracing_url
        .map(|url| init_tracer(url, sample_ratio))
        .transpose()?
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    Registry::default()
        .with(logger)
        .with(env_filter)
        .with(otel)
        .try_init()
        .map_err(Error::TracingSubscriberError)
}

#[cfg(test)]
mod test {
    use super::{LogFormat, get_trace_id};

    use clap::ValueEnum;
    use opentelemetry::trace::TraceId;

    #[test]
    fn test_get_trace_id_without_exporter() {
        // no opentelemetry layer is installed, so spans carry an invalid context
        assert_eq!(get_trace_id(), TraceId::INVALID);
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(LogFormat::from_str("json", true), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("text", true), Ok(LogFormat::Text));
        assert!(LogFormat::from_str("xml", true).is_err());
    }
}
