//! Tracing setup shared by dispatch binaries.
//!
//! [`init_tracing`] installs the global subscriber with an `EnvFilter`
//! and either human-readable or newline-delimited JSON output. The global
//! subscriber can only be set once per process, so repeated calls are
//! silently ignored.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence for filtering; `level` is the default
/// verbosity when it is not set. With `json` enabled, log lines are
/// emitted as JSON for aggregation pipelines.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}
