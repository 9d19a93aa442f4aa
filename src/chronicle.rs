//! Narrative sink for the story the simulation tells.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Receives narrative entries. The engine writes to it and never reads back.
pub trait Chronicle {
    fn log_event(&mut self, year: u64, message: &str);
    fn log_major_event(&mut self, year: u64, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub year: u64,
    pub message: String,
}

/// In-memory chronicle that optionally echoes entries to stdout as they
/// arrive.
#[derive(Debug, Default)]
pub struct ChronicleLog {
    events: Vec<Entry>,
    major_events: Vec<Entry>,
    echo: bool,
}

impl ChronicleLog {
    pub fn new(echo: bool) -> Self {
        Self {
            echo,
            ..Self::default()
        }
    }

    pub fn events(&self) -> &[Entry] {
        &self.events
    }

    pub fn major_events(&self) -> &[Entry] {
        &self.major_events
    }

    pub fn events_for_year(&self, year: u64) -> impl Iterator<Item = &str> {
        self.events
            .iter()
            .filter(move |entry| entry.year == year)
            .map(|entry| entry.message.as_str())
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&"=".repeat(60));
        out.push_str("\n         CHRONICLE OF THE REALM\n");
        out.push_str(&"=".repeat(60));
        out.push('\n');
        if self.major_events.is_empty() {
            out.push_str("No major events occurred during this period.\n");
        } else {
            out.push_str("\nMajor Events:\n");
            out.push_str(&"-".repeat(40));
            out.push('\n');
            for entry in &self.major_events {
                out.push_str(&format!("Year {}: {}\n", entry.year, entry.message));
            }
        }
        out.push('\n');
        out.push_str(&"-".repeat(40));
        out.push('\n');
        out.push_str(&format!("Total events recorded: {}\n", self.events.len()));
        out.push_str(&format!("Major milestones: {}\n", self.major_events.len()));
        out.push_str(&"=".repeat(60));
        out.push('\n');
        out
    }

    /// Writes major and routine entries as plain text. Without a path the
    /// file lands in the working directory, named after the local time.
    pub fn export_to_file(&self, path: Option<&Path>) -> io::Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(format!(
                "chronicle_{}.txt",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            )),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut text = String::new();
        text.push_str("CHRONICLE OF THE REALM\n");
        text.push_str(&"=".repeat(50));
        text.push_str("\n\nMAJOR EVENTS:\n");
        text.push_str(&"-".repeat(30));
        text.push('\n');
        for entry in &self.major_events {
            text.push_str(&format!("Year {}: {}\n", entry.year, entry.message));
        }
        text.push_str("\n\nDETAILED EVENTS:\n");
        text.push_str(&"-".repeat(30));
        text.push('\n');
        for entry in &self.events {
            text.push_str(&format!("Year {}: {}\n", entry.year, entry.message));
        }
        fs::write(&path, text)?;
        tracing::info!(path = %path.display(), "chronicle exported");
        Ok(path)
    }
}

impl Chronicle for ChronicleLog {
    fn log_event(&mut self, year: u64, message: &str) {
        if self.echo {
            println!("  [Year {year}] {message}");
        }
        self.events.push(Entry {
            year,
            message: message.to_string(),
        });
    }

    fn log_major_event(&mut self, year: u64, message: &str) {
        if self.echo {
            println!("\n*** [YEAR {year}] {message} ***\n");
        }
        self.major_events.push(Entry {
            year,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_routine_and_major_separately() {
        let mut log = ChronicleLog::new(false);
        log.log_event(1, "a drought");
        log.log_event(2, "a harvest");
        log.log_major_event(2, "a founding");

        assert_eq!(log.events().len(), 2);
        assert_eq!(log.major_events().len(), 1);
        assert_eq!(log.events_for_year(2).collect::<Vec<_>>(), vec!["a harvest"]);
        assert!(log.summary().contains("Year 2: a founding"));
        assert!(log.summary().contains("Total events recorded: 2"));
    }

    #[test]
    fn empty_summary_mentions_quiet_period() {
        let log = ChronicleLog::new(false);
        assert!(log
            .summary()
            .contains("No major events occurred during this period."));
    }

    #[test]
    fn export_writes_both_sections() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("chronicle.txt");
        let mut log = ChronicleLog::new(false);
        log.log_major_event(1, "The civilization of Elves is founded");
        log.log_event(3, "Tensions rise");

        let written = log.export_to_file(Some(&target)).unwrap();
        assert_eq!(written, target);
        let text = fs::read_to_string(&written).unwrap();
        assert!(text.starts_with("CHRONICLE OF THE REALM"));
        assert!(text.contains("Year 1: The civilization of Elves is founded"));
        assert!(text.contains("Year 3: Tensions rise"));
    }
}
