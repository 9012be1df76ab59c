//! Tracing subscriber setup.

use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Install a stderr subscriber at `level`; `RUST_LOG` takes precedence.
///
/// An unparsable level falls back to `info`. Calling this twice is harmless:
/// the second registration is ignored.
pub fn init(level: &str) {
    let directive = level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);

    let filter = EnvFilter::builder()
        .with_default_directive(directive.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
