//! Shared tracing initialization for the four GI evaluation pipeline
//! binaries (`gi_eval_service`, `gi_sandbox_service`, `gi_classifier`).
//!
//! Every handler and background tick is expected to open a `tracing`
//! span; this crate only owns subscriber construction so each binary's
//! `main.rs` stays a one-liner.

use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default `RUST_LOG` directive used when the environment variable is unset.
/// Each binary should pass its own crate name so its own spans are
/// promoted to `info` even under the shared default.
pub fn init(binary_name: &str) {
    let default_directive = format!("warn,{binary_name}=info,gi_hypervisor=info,gi_db=info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(env::var_os("NO_COLOR").is_none()),
        )
        .with(filter)
        .init();
}
