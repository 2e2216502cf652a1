//! Session logger: writes all log output to a single file.
//!
//! The file is **truncated (overwritten) at each launch**, so it only ever
//! contains output from the most-recent session.
//!
//! Default location (override with `--log-file`):
//!   Windows:  `%APPDATA%\ImgFE\imgfe.log`
//!   Linux:    `~/.local/share/ImgFE/imgfe.log`
//!   macOS:    `~/Library/Application Support/ImgFE/imgfe.log`
//!
//! Anywhere in the crate use the `log_info!` / `log_warn!` / `log_err!`
//! macros. Until [`init`] has been called they are no-ops, so library users
//! and tests never touch the filesystem.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();

/// Append a raw line to the session log. I/O errors are ignored.
pub fn write_line(line: &str) {
    if let Some(mutex) = LOG_FILE.get()
        && let Ok(mut file) = mutex.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

/// Write a timestamped, level-tagged line to the session log.
pub fn write(level: &str, msg: &str) {
    if LOG_FILE.get().is_none() {
        return;
    }
    write_line(&format_entry(&timestamp(), level, msg));
}

fn format_entry(ts: &str, level: &str, msg: &str) -> String {
    format!("[{}] [{}] {}", ts, level, msg)
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write("INFO", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write("WARN", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write("ERROR", &format!($($arg)*));
    };
}

/// Open the session log at `path` (platform default when `None`), truncating
/// any previous session, and mirror panics into it. Later calls are ignored.
pub fn init(path: Option<&Path>) {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_log_path);

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("warning: session log {} unavailable: {}", path.display(), e);
            return;
        }
    };
    if LOG_FILE.set(Mutex::new(file)).is_err() {
        // already initialised for this process
        return;
    }

    write_line(&format!("=== ImgFE session started {} ===", human_timestamp()));
    write_line(&format!("Log file: {}", path.display()));
    write_line("");

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write_line(&format_entry(&timestamp(), "PANIC", &info.to_string()));
        prev(info);
    }));
}

fn default_log_path() -> PathBuf {
    data_dir().join("ImgFE").join("imgfe.log")
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support");
        }
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from(".")
}

/// HH:MM:SS (UTC) within the current day.
fn timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => clock_time(d.as_secs()),
        Err(_) => "??:??:??".to_string(),
    }
}

fn clock_time(secs: u64) -> String {
    let h = (secs % 86400) / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

fn human_timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => format!("(unix {})", d.as_secs()),
        Err(_) => "(unknown time)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_wraps_at_midnight() {
        assert_eq!(clock_time(0), "00:00:00");
        assert_eq!(clock_time(86_399), "23:59:59");
        assert_eq!(clock_time(86_400 + 3_661), "01:01:01");
    }

    #[test]
    fn macros_write_to_initialised_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        init(Some(&path));
        crate::log_warn!("pattern '{}' matched no files", "*.txt");
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("=== ImgFE session started"), "{text}");
        assert!(text.contains("[WARN] pattern '*.txt' matched no files"), "{text}");
    }

    #[test]
    fn entry_layout() {
        assert_eq!(format_entry("12:00:00", "WARN", "hi"), "[12:00:00] [WARN] hi");
    }
}
