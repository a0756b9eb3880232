use tracing_subscriber::EnvFilter;

const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
const DEFAULT_DIRECTIVE: &str = "scrapemaster=info,tower_http=info";

/// Installs the global subscriber. `RUST_LOG` selects levels; `LOG_FORMAT=json`
/// switches to one JSON object per line.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
