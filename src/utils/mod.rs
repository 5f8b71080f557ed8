pub mod logging;

/// Logging setup for host binaries embedding the pipeline. Reads `RUST_LOG`,
/// defaulting to info.
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
