use super::LogFormat;

/// Configure tracing once at startup for the whole process.
///
/// `RUST_LOG` controls verbosity (default `info`), e.g.
/// `RUST_LOG=storefront::store=debug,tower_http=debug`.
pub fn setup_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime());

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().with_target(false).init(),
    }
}
