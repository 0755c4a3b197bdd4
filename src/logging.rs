//! Tracing subscriber wiring for embedding hosts.
//!
//! The engine logs through `tracing`; hosts that have no subscriber of their
//! own call [`init`] once at startup. `RUST_LOG` overrides the level chosen
//! from the verbosity flags.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global subscriber. Repeated calls are no-ops.
pub fn init(verbose: bool, quiet: bool) {
    let filter = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
