use tracing_subscriber::EnvFilter;

/// Install the global subscriber: `RUST_LOG` when set, `default_level`
/// otherwise. Records from the `log` facade are forwarded to it.
pub fn init(default_level: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to set tracing subscriber: {}", e))?;
    tracing_log::LogTracer::init().map_err(|e| format!("Failed to bridge log records: {}", e))?;
    Ok(())
}
