//! Tracing subscriber setup for hosts embedding the runtime.
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "info,sim::procedure=debug";

/// Installs a stderr subscriber filtered by `RUST_LOG`.
///
/// Falls back to `default_directives` when the environment sets no filter.
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(default_directives: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialization_is_refused() {
        init_logging(DEFAULT_DIRECTIVES);
        assert!(!init_logging(DEFAULT_DIRECTIVES));
    }
}
