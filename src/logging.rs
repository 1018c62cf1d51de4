use std::io::Write;

/// Install the process-wide logger. Safe to call more than once; later calls
/// are ignored.
pub fn init(filter: &str) {
    let result = env_logger::Builder::new()
        .parse_filters(filter)
        .format(|buf, record| {
            let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{}] {:<5} {}: {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();

    if result.is_ok() {
        log::info!("=== coach-portal v{} started ===", env!("CARGO_PKG_VERSION"));
        log::debug!("OS: {} Arch: {}", std::env::consts::OS, std::env::consts::ARCH);
    }
}
