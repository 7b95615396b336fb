use std::io::IsTerminal;

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::{LogFormat, LoggingConfig};

/// `RUST_LOG` wins over the configured level
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Formatting layer for the configured format, writing to `writer`
pub(crate) fn fmt_layer<S, W>(
    format: &LogFormat,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(writer)
            .with_ansi(ansi)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    }
}

/// Install the global subscriber; a second call is a no-op
///
/// Logs go to stderr so stdout stays free for command output.
pub fn init_logging(config: &LoggingConfig) {
    let ansi = std::io::stderr().is_terminal();

    let installed = tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(fmt_layer(&config.format, std::io::stderr, ansi))
        .try_init();

    if installed.is_ok() {
        tracing::info!(level = %config.level, format = ?config.format, "Logging initialized");
    }
}


#[cfg(test)]
mod tests {
    use super::capture::CapturedLogs;
    use super::*;

    #[test]
    fn test_invalid_level_falls_back() {
        let filter = build_filter("not a [valid directive");
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn test_repeated_init_does_not_panic() {
        let config = LoggingConfig::default();
        init_logging(&config);
        init_logging(&config);
    }

    #[test]
    fn test_layer_writes_to_given_writer_without_ansi() {
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::registry()
            .with(fmt_layer(&LogFormat::Pretty, move || sink.clone(), false));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(step = 1, "Step result");
        });

        let contents = logs.contents();
        assert!(contents.contains("Step result"));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn test_json_layer_emits_json_lines() {
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::registry()
            .with(fmt_layer(&LogFormat::Json, move || sink.clone(), true));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Artifact written");
        });

        let contents = logs.contents();
        let line = contents.lines().next().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(parsed["fields"]["message"], "Artifact written");
    }
}
