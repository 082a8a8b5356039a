//! Logging setup
//!
//! Installs a `tracing` fmt subscriber. `RUST_LOG` takes precedence over the
//! level passed on the command line.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// # Arguments
/// * `level` - Fallback filter directive when `RUST_LOG` is unset (e.g. "info")
pub fn init(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::debug!("Logging initialized at '{}'", level);
    Ok(())
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("bi_chart_options=debug".parse().unwrap());

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
