//! Tracing configuration for the pipeline crates.
//!
//! Output goes to stderr so it never mixes with formatted code on stdout.
//! Filtering uses the usual `RUST_LOG` syntax through `ASPECT_LOG`:
//!
//! ```bash
//! ASPECT_LOG=debug aspect file.js
//! ASPECT_LOG="aspect_visit=trace,aspect_formatter=debug" aspect file.js
//! ```
//!
//! The subscriber is only installed when `ASPECT_LOG` (or `RUST_LOG`) is
//! set, so there is zero overhead in normal runs.

use tracing_subscriber::EnvFilter;

/// Build an `EnvFilter` from `ASPECT_LOG`, falling back to `RUST_LOG`.
///
/// `ASPECT_LOG` takes precedence when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("ASPECT_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `ASPECT_LOG` nor `RUST_LOG` is set. Safe to
/// call more than once; later calls are ignored.
pub fn init() {
    let has_aspect_log = std::env::var("ASPECT_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_aspect_log && !has_rust_log {
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
