//! Log subscriber for the CLI.
//!
//! The filter comes from `RILL_LOG`, then `RUST_LOG`, and defaults to
//! warnings only, or to engine debug output with `--debug`. `--trace`
//! renders spans as an indented tree, which reads like the call tree being
//! evaluated.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_tree::HierarchicalLayer;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. Later calls do nothing.
pub fn init_tracing(trace: bool, debug: bool) {
    TRACING_INIT.call_once(|| {
        let default = if trace {
            "rill_eval=trace"
        } else if debug {
            "warn,rill_eval=debug"
        } else {
            "warn"
        };
        let filter = EnvFilter::try_from_env("RILL_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(default));

        let tree = trace.then(|| HierarchicalLayer::new(2).with_targets(true));
        let flat = (!trace).then(|| {
            fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(std::io::stderr)
        });

        // Another subscriber may already be installed by an embedder.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tree)
            .with(flat)
            .try_init();
    });
}
