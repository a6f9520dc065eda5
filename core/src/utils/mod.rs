mod options;

pub use options::*;

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn setup_logger() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  let _ = tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(filter)
    .try_init();
}
