use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use log::{Level, LevelFilter, Log, Metadata, Record};

const LOG_DIR: &str = "logs";
const EVENT_LOG: &str = "events.log";
const START_LOG: &str = "starts.log";
const ERROR_LOG: &str = "errorLog.log";

/// Appends one line to a flat log file under `logs/`. Logging must never
/// take the process down, so every I/O failure here is swallowed.
fn append(file: &str, line: &str) {
    let dir = Path::new(LOG_DIR);
    let _ = std::fs::create_dir_all(dir);
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(dir.join(file)) {
        let _ = writeln!(f, "{}", line);
    }
}

/// Current local date and time as `DD-MM-YYYY HH:MM:SS`.
pub fn timestamp() -> String {
    chrono::Local::now().format("%d-%m-%Y %H:%M:%S").to_string()
}

fn format_line(timestamp: &str, message: &str) -> String {
    format!("{}:    {}", timestamp, message)
}

/// Flat-file sink behind the `log` facade.
///
/// Info and above goes to `events.log`. Errors additionally land in
/// `errorLog.log`, leave a marker line in `events.log` and are mirrored to
/// stderr so the diagnostic is visible without opening the log files.
struct FileLogger;

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();
        match record.level() {
            Level::Error => {
                eprintln!("{}", message);
                append(ERROR_LOG, &format_line(&timestamp(), &message));
                append(
                    EVENT_LOG,
                    &format_line(
                        &timestamp(),
                        "========EXCEPTION THROWN:  CHECK ERROR LOG FOR DETAILS========",
                    ),
                );
            }
            _ => append(EVENT_LOG, &format_line(&timestamp(), &message)),
        }
    }

    fn flush(&self) {}
}

/// Installs the file logger and writes the session-start records.
/// Idempotent: a second call only re-emits the start records.
pub fn init() {
    if log::set_boxed_logger(Box::new(FileLogger)).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
    append(
        EVENT_LOG,
        &format!(
            "----------------------{}----PROCESS EXECUTION STARTED----------------------",
            timestamp()
        ),
    );
    append(START_LOG, &format_line(&timestamp(), "Startup successful"));
}

/// Writes the session-end records on orderly shutdown.
pub fn shutdown() {
    append(
        EVENT_LOG,
        &format!(
            "----------------------{}----PROCESS EXECUTION TERMINATED----------------------",
            timestamp()
        ),
    );
    append(START_LOG, &format_line(&timestamp(), "Shutdown with code 0"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_day_month_year_time() {
        let ts = timestamp();
        // DD-MM-YYYY HH:MM:SS
        assert_eq!(ts.len(), 19);
        let bytes = ts.as_bytes();
        assert_eq!(bytes[2], b'-');
        assert_eq!(bytes[5], b'-');
        assert_eq!(bytes[10], b' ');
        assert_eq!(bytes[13], b':');
        assert_eq!(bytes[16], b':');
        let day: u32 = ts[0..2].parse().unwrap();
        let month: u32 = ts[3..5].parse().unwrap();
        let year: u32 = ts[6..10].parse().unwrap();
        assert!((1..=31).contains(&day));
        assert!((1..=12).contains(&month));
        assert!(year >= 2024);
    }

    #[test]
    fn log_lines_put_the_timestamp_first() {
        let line = format_line("01-02-2026 03:04:05", "Engine successfully initialized");
        assert_eq!(line, "01-02-2026 03:04:05:    Engine successfully initialized");
    }
}
