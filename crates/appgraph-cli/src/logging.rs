//! Diagnostic logging on stderr.
//!
//! `RUST_LOG` wins when set; otherwise `-v` / `-vv` raise the level from
//! `warn` to `info` / `debug`. Progress confirmations are not logs and go to
//! stdout regardless.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
