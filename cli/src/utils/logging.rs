/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `--debug` selects `debug` and `level` applies.
/// An already installed subscriber is left in place.
pub fn init_logging(debug: bool, level: &str) {
    let level = if debug { "debug" } else { level };

    // a global subscriber may already be set, keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(debug)
        .with_line_number(debug)
        .with_file(debug)
        .try_init();
}
