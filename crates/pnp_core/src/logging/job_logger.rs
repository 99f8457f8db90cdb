//! Job log: one text file per job, fed by processor events.
//!
//! `JobLogger` is a [`JobProcessorListener`]. Registered with a processor
//! it writes lifecycle, placement and error events to `<logs>/<job>.log`
//! and, optionally, to a console callback. Machine status lines are kept
//! in a short tail that is written out when the job fails; outside compact
//! mode they are also written as they happen.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use crate::config::Settings;
use crate::models::{BoardLocation, Job, Placement};
use crate::processor::{JobError, JobProcessorListener, JobState};

use super::types::{GuiLogCallback, LogConfig, LogLevel, MessagePrefix};

#[derive(Debug, Default)]
struct Counters {
    total: usize,
    placed: usize,
    last_logged_percent: u32,
}

pub struct JobLogger {
    job_name: String,
    log_path: PathBuf,
    config: LogConfig,
    writer: Mutex<Option<BufWriter<File>>>,
    console: Option<GuiLogCallback>,
    recent_status: Mutex<VecDeque<String>>,
    counters: Mutex<Counters>,
}

impl JobLogger {
    /// Create `<log_dir>/<job_name>.log`, truncating an existing file.
    pub fn new(
        job_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        console: Option<GuiLogCallback>,
    ) -> io::Result<Self> {
        let job_name = job_name.into();
        fs::create_dir_all(log_dir.as_ref())?;
        let log_path = log_dir
            .as_ref()
            .join(format!("{}.log", file_stem(&job_name)));
        let file = File::create(&log_path)?;

        Ok(Self {
            recent_status: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            job_name,
            log_path,
            config,
            writer: Mutex::new(Some(BufWriter::new(file))),
            console,
            counters: Mutex::new(Counters::default()),
        })
    }

    /// Logger placed in the configured logs folder with the `[logging]`
    /// options.
    pub fn from_settings(job_name: impl Into<String>, settings: &Settings) -> io::Result<Self> {
        Self::new(
            job_name,
            &settings.paths.logs_folder,
            settings.logging.log_config(),
            None,
        )
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Write `text` with `prefix` if `level` passes the configured filter.
    pub fn write(&self, level: LogLevel, prefix: MessagePrefix, text: &str) {
        if level >= self.config.level {
            self.emit(&prefix.format(text));
        }
    }

    pub fn info(&self, text: &str) {
        self.write(LogLevel::Info, MessagePrefix::None, text);
    }

    pub fn debug(&self, text: &str) {
        self.write(LogLevel::Debug, MessagePrefix::None, text);
    }

    /// Write a progress line. In compact mode only the first value in each
    /// `progress_step` band is written, and 100% always is.
    ///
    /// Returns whether the line was written.
    pub fn progress(&self, percent: u32) -> bool {
        if self.config.compact {
            let step = self.config.progress_step.max(1);
            let mut counters = self.counters.lock();
            if percent < 100 && percent / step <= counters.last_logged_percent / step {
                return false;
            }
            counters.last_logged_percent = percent;
        }
        self.info(&format!("Progress: {}%", percent));
        true
    }

    /// Record a machine status line in the tail.
    pub fn status(&self, line: &str) {
        if self.config.error_tail > 0 {
            let mut recent = self.recent_status.lock();
            while recent.len() >= self.config.error_tail {
                recent.pop_front();
            }
            recent.push_back(line.to_string());
        }
        if !self.config.compact {
            self.write(LogLevel::Debug, MessagePrefix::Status, line);
        }
    }

    /// Write the status tail under a `[header/tail]` line, regardless of
    /// level.
    pub fn write_tail(&self, header: &str) {
        let lines = self.tail();
        if lines.is_empty() {
            return;
        }
        self.emit(&format!("[{}/tail]", header));
        for line in &lines {
            self.emit(line);
        }
    }

    pub fn tail(&self) -> Vec<String> {
        self.recent_status.lock().iter().cloned().collect()
    }

    pub fn flush(&self) {
        if let Some(writer) = self.writer.lock().as_mut() {
            let _ = writer.flush();
        }
    }

    /// Flush and release the file. Later writes only reach the console.
    pub fn close(&self) {
        if let Some(mut writer) = self.writer.lock().take() {
            let _ = writer.flush();
        }
    }

    fn emit(&self, text: &str) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), text)
        } else {
            text.to_string()
        };

        if let Some(writer) = self.writer.lock().as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
        if let Some(console) = &self.console {
            console(&line);
        }
    }
}

impl JobProcessorListener for JobLogger {
    fn job_loaded(&self, job: &Job) {
        let total = job.active_placement_count();
        *self.counters.lock() = Counters {
            total,
            ..Counters::default()
        };
        self.recent_status.lock().clear();
        self.write(
            LogLevel::Info,
            MessagePrefix::Section,
            &format!("Job loaded: {}", job.name),
        );
        self.info(&format!(
            "{} board(s), {} placement(s)",
            job.board_locations.len(),
            total
        ));
    }

    fn job_state_changed(&self, state: JobState) {
        self.write(LogLevel::Info, MessagePrefix::Phase, &state.to_string());
        if state == JobState::Stopped {
            self.flush();
        }
    }

    fn job_encountered_error(&self, error: JobError, description: &str) {
        self.write(
            LogLevel::Error,
            MessagePrefix::Error,
            &format!("{}: {}", error, description),
        );
        self.write_tail(&error.to_string());
        self.flush();
    }

    fn part_processing_started(&self, board: &BoardLocation, placement: &Placement) {
        self.debug(&format!("Processing {} on {}", placement, board.board.name));
    }

    fn part_picked(&self, _board: &BoardLocation, placement: &Placement) {
        self.info(&format!("Picked {}", placement));
    }

    fn part_placed(&self, board: &BoardLocation, placement: &Placement) {
        self.write(
            LogLevel::Info,
            MessagePrefix::Success,
            &format!("Placed {} on {}", placement, board.board.name),
        );

        let percent = {
            let mut counters = self.counters.lock();
            counters.placed += 1;
            (counters.total > 0)
                .then(|| (counters.placed.min(counters.total) * 100 / counters.total) as u32)
        };
        if let Some(percent) = percent {
            self.progress(percent);
        }
    }

    fn part_processing_completed(&self, _board: &BoardLocation, placement: &Placement) {
        self.debug(&format!("Completed {}", placement));
    }

    fn detailed_status_updated(&self, status: &str) {
        self.status(status);
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Job name with path separators and reserved characters replaced.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect()
}
