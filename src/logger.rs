use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

use crate::output::Painter;

/// Environment variable holding the log level. `RUST_LOG` is read when it is unset.
pub const LOG_ENV: &str = "MANGO_LOG";

static LOGGER: OnceLock<MangoLogger> = OnceLock::new();

struct MangoLogger {
    painter: Mutex<Painter>,
    file: Option<Mutex<std::fs::File>>,
    filter: LevelFilter,
    start: Instant,
}

impl MangoLogger {
    fn new(filter: LevelFilter, painter: Painter, file: Option<std::fs::File>) -> Self {
        Self {
            painter: Mutex::new(painter),
            file: file.map(Mutex::new),
            filter,
            start: Instant::now(),
        }
    }

    fn tag(&self, level: Level) -> String {
        level_tag(&self.painter.lock(), level)
    }
}

impl Log for MangoLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        eprintln!(
            "{} {}",
            self.tag(record.level()),
            record.args()
        );

        if let Some(ref file) = self.file {
            let elapsed = self.start.elapsed().as_secs_f64();
            let _ = writeln!(
                file.lock(),
                "[{elapsed:.3}s] [{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Some(ref file) = self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Level filter from the environment, raised by each `-v`.
#[must_use]
pub fn level_filter(verbosity: u8) -> LevelFilter {
    let from_env = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LevelFilter::Warn);
    let from_flags = match verbosity {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    from_env.max(from_flags)
}

/// Initialize the global logger. Must be called once before any logging.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init(filter: LevelFilter, painter: Painter, log_file: Option<std::fs::File>) {
    let logger = LOGGER.get_or_init(|| MangoLogger::new(filter, painter, log_file));

    log::set_logger(logger).expect("logger already initialized");
    log::set_max_level(filter);
}

/// Switch the colors of stderr log lines, once the repository config is known.
pub fn set_painter(painter: Painter) {
    if let Some(logger) = LOGGER.get() {
        *logger.painter.lock() = painter;
    }
}

/// Colored `mango[level]` prefix for a stderr log line.
#[must_use]
pub fn level_tag(painter: &Painter, level: Level) -> String {
    let tag = format!("mango[{}]", level.as_str().to_lowercase());
    match level {
        Level::Error => painter.error(&tag),
        Level::Warn => painter.warn(&tag),
        Level::Info => painter.info(&tag),
        Level::Debug | Level::Trace => painter.dim(&tag),
    }
}
