pub mod buffer;

use tracing_subscriber::EnvFilter;

/// Tracing setup: JSON output in production, pretty output everywhere else,
/// with RUST_LOG taking precedence over the defaults.
pub fn init(environment: &str) {
    let is_production = environment == "production";

    let default_filter = if is_production {
        "justjoin_backend=info,tower_http=info"
    } else {
        "justjoin_backend=debug,tower_http=debug,axum=debug"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if is_production {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
