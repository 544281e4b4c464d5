use opentelemetry::sdk::trace::config;
use opentelemetry::sdk::Resource;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{new_exporter, new_pipeline, WithExportConfig};
use serde::Deserialize;
use tonic::metadata::MetadataMap;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StdoutFmt {
    Pretty,
    Json,
    Compact,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    /// OTLP collector endpoint, e.g. https://api.honeycomb.io:443.
    /// Unset disables opentelemetry export.
    pub otel: Option<String>,
    #[serde(default = "default_stdout")]
    pub stdout: StdoutFmt,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    pub api_key: Option<String>,
}

fn default_stdout() -> StdoutFmt {
    StdoutFmt::Pretty
}

fn default_level() -> String {
    tracing::Level::INFO.to_string()
}

fn default_service_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

pub fn tracing_config<P: AsRef<str>>(prefix: P) -> Result<Config, envy::Error> {
    envy::prefixed(prefix.as_ref().to_string()).from_env::<Config>()
}

pub fn initialize_tracing(c: &Config) -> anyhow::Result<()> {
    let (json, compact, pretty) = match c.stdout {
        StdoutFmt::Json => (Some(tracing_subscriber::fmt::layer().json()), None, None),
        StdoutFmt::Compact => (None, Some(tracing_subscriber::fmt::layer().compact()), None),
        StdoutFmt::Pretty => (None, None, Some(tracing_subscriber::fmt::layer().pretty())),
    };

    let opentelemetry = match &c.otel {
        Some(collector_endpoint) => {
            let mut map = MetadataMap::with_capacity(1);
            if let Some(api_key) = &c.api_key {
                map.insert("x-honeycomb-team", api_key.parse()?);
            }

            let tracer = new_pipeline()
                .tracing()
                .with_exporter(
                    new_exporter()
                        .tonic()
                        .with_metadata(map)
                        .with_endpoint(collector_endpoint.to_string()),
                )
                .with_trace_config(config().with_resource(Resource::new(vec![KeyValue::new(
                    "service.name",
                    c.service_name.clone(),
                )])))
                .install_simple()?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&c.level))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(json)
        .with(pretty)
        .with(compact)
        .with(opentelemetry)
        .try_init()?;

    Ok(())
}

pub fn shutdown_tracer_provider() {
    opentelemetry::global::shutdown_tracer_provider()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdout_defaults_to_pretty_without_export() {
        let vars: Vec<(String, String)> = vec![];
        let config = envy::from_iter::<_, Config>(vars).unwrap();

        assert_eq!(config.stdout, StdoutFmt::Pretty);
        assert_eq!(config.level, "INFO");
        assert_eq!(config.service_name, "spacetraveling");
        assert!(config.otel.is_none());
    }

    #[test]
    fn stdout_format_is_lowercase() {
        let vars = vec![
            (String::from("STDOUT"), String::from("json")),
            (String::from("OTEL"), String::from("http://localhost:4317")),
        ];
        let config = envy::from_iter::<_, Config>(vars).unwrap();

        assert_eq!(config.stdout, StdoutFmt::Json);
        assert_eq!(config.otel.as_deref(), Some("http://localhost:4317"));
    }
}
