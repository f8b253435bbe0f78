//! Tracing setup shared by the plugin and CLI binaries.
//!
//! Logs always go to stderr: stdout carries plugin frames, MCP/LSP JSON-RPC,
//! or command output. `RUST_LOG` overrides the verbosity-derived filter.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive for a `-v` count.
pub fn filter_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "nu_plugin_siteplan=warn",
        1 => "nu_plugin_siteplan=info",
        2 => "nu_plugin_siteplan=debug",
        _ => "nu_plugin_siteplan=trace",
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing(verbose: u8) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(verbose)));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
