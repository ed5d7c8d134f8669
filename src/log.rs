//! Simple log writer with timestamps
//!
//! Every line is prefixed with the seconds elapsed since the log was opened and
//! the delta since the previous line. Output goes to the console, to a file,
//! to both, or nowhere.

use crate::{Error, Result};
use chrono::{Local, Utc};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Clone)]
pub struct LogFile {
    inner: Arc<LogFileInner>,
}

struct LogFileInner {
    state: Mutex<LogState>,
    start: Instant,
    output_to_console: bool,
}

struct LogState {
    writer: Option<BufWriter<File>>,
    last_seconds: f32,
}

impl LogFile {
    /// Open a log, optionally backed by a file
    ///
    /// When a file is given, a header with the current time and system
    /// information is written first.
    pub fn new(path: Option<&Path>, output_to_console: bool) -> Result<Self> {
        let writer = match path {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    Error::FileSave(format!("Unable to create file {}: {}", path.display(), e))
                })?;
                Some(BufWriter::new(file))
            }
            None => None,
        };
        let has_file = writer.is_some();

        let log = Self::from_parts(writer, output_to_console);

        if let (true, Some(path)) = (has_file, path) {
            log.log(format!("Opened {}", path.display()))?;
            log.log("\n----------------------------------------\n")?;
            log.log_time()?;
            log.log("\n----------------------------------------\n")?;
            log.log("System Info:\n")?;
            log.log(format!("Operating System      {}", env::consts::OS))?;
            log.log(format!("Architecture:         {}", env::consts::ARCH))?;
            log.log(format!(
                "Command Line:         {}",
                env::args().collect::<Vec<_>>().join(" ")
            ))?;
            log.log("\n----------------------------------------\n")?;
        }

        Ok(log)
    }

    /// Console-only log
    pub fn console() -> Self {
        Self::from_parts(None, true)
    }

    /// A log that discards everything
    pub fn silent() -> Self {
        Self::from_parts(None, false)
    }

    fn from_parts(writer: Option<BufWriter<File>>, output_to_console: bool) -> Self {
        Self {
            inner: Arc::new(LogFileInner {
                state: Mutex::new(LogState {
                    writer,
                    last_seconds: 0.0,
                }),
                start: Instant::now(),
                output_to_console,
            }),
        }
    }

    pub fn log(&self, message: impl AsRef<str>) -> Result<()> {
        self.inner.log_lines(message.as_ref())
    }

    pub fn log_time(&self) -> Result<()> {
        let utc = Utc::now();
        let local = Local::now();
        self.log(format!(
            "Current time (UTC): {}",
            utc.format("%Y-%m-%d %H:%M:%S (UTC)")
        ))?;
        self.log(format!(
            "Current local time: {}",
            local.format("%Y-%m-%d %H:%M:%S (%z)")
        ))?;
        Ok(())
    }
}

impl LogFileInner {
    fn log_lines(&self, message: &str) -> Result<()> {
        let seconds = self.start.elapsed().as_secs_f32();

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let diff = seconds - state.last_seconds;
        let prefix = format!("{:7.0}s {:6.1}+ ", seconds, diff);

        for line in message.split('\n') {
            if self.output_to_console {
                println!("{}{}", prefix, line);
            }
            if let Some(writer) = state.writer.as_mut() {
                writer.write_all(prefix.as_bytes())?;
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
            state.last_seconds = seconds;
        }

        Ok(())
    }

    fn has_file(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .writer
            .is_some()
    }
}

impl Drop for LogFileInner {
    fn drop(&mut self) {
        if !self.has_file() {
            return;
        }
        let _ = self.log_lines("\n----------------------------------------\n");
        let _ = self.log_lines("Closing log file.");
        let _ = self.log_lines(&format!(
            "Current time (UTC): {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S (UTC)")
        ));
        let _ = self.log_lines("Done.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TempFolder;

    #[test]
    fn test_log_file_writes_lines() {
        let tmp = TempFolder::new().unwrap();
        let path = tmp.path().join("run.log");
        {
            let log = LogFile::new(Some(&path), false).unwrap();
            log.log("first line").unwrap();
            log.log("second\nthird").unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("first line"));
        assert!(content.contains("third"));
        assert!(content.contains("Closing log file."));
    }

    #[test]
    fn test_silent_log_accepts_messages() {
        let log = LogFile::silent();
        assert!(log.log("ignored").is_ok());
    }
}
