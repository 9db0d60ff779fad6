use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATE_TARGET: &str = "network_replicator";

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(&cli_directive(verbose)))
        .with(base_layer().compact())
        .init();
}

/// JSON output for hosts that ship logs to a collector.
pub fn init_json_logger(level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(&json_directive(level)))
        .with(base_layer().json())
        .init();
}

/// `RUST_LOG` wins over the built-in default.
fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

fn base_layer<S>() -> fmt::Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

fn cli_directive(verbose: bool) -> String {
    if verbose {
        format!("{}=debug,info", CRATE_TARGET)
    } else {
        format!("{}=info", CRATE_TARGET)
    }
}

fn json_directive(level: Option<&str>) -> String {
    let level = level.map(str::trim).filter(|l| !l.is_empty()).unwrap_or("info");
    format!("{}={}", CRATE_TARGET, level.to_lowercase())
}
