use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("formatting error: {0}")]
    FormattingError(#[source] std::fmt::Error),

    #[error("tracing exporter error: {0}")]
    TracingExporterError(#[source] opentelemetry_otlp::ExporterBuildError),

    #[error("tracing subscriber error: {0}")]
    TracingSubscriberError(#[source] tracing_subscriber::util::TryInitError),

    #[error("invalid log filter: {0}")]
    LogFilterError(#[source] tracing_subscriber::filter::ParseError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
