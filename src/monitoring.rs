//! Tracing bootstrap.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` controls the filter (default
/// "info"); `LOG_FORMAT=json` switches to newline-delimited JSON for log
/// shippers.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
