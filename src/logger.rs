use env_logger::{Builder, Env};
use std::io::Write;
use log::info;

// Colored, timestamped log lines; RUST_LOG overrides the default level
pub fn setup_logger() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    builder
        .format(|buf, record| {
            let level_color = match record.level() {
                log::Level::Error => "\x1B[1;31m", // Bold Red
                log::Level::Warn => "\x1B[1;33m",  // Bold Yellow
                log::Level::Info => "\x1B[1;32m",  // Bold Green
                log::Level::Debug => "\x1B[1;36m", // Bold Cyan
                log::Level::Trace => "\x1B[1;35m", // Bold Magenta
            };
            let reset = "\x1B[0m";

            writeln!(
                buf,
                "[{}] {}{:<5}{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                level_color,
                record.level(),
                reset,
                record.target(),
                record.args()
            )
        })
        .init();

    info!("Logger initialized");
}
