//! Subscriber setup for the binary

use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str = "verdict_core=debug,verdict=info";
const DEFAULT_FILTER: &str = "info";

/// `RUST_LOG` wins over the `--verbose` default
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    })
}

pub fn init(verbose: bool, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
