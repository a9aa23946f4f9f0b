//! Aggregate statistics from an accumulated diffstat log

use std::fmt;
use std::fs;
use std::path::Path;

use minitree_core::{Error, Result};

/// Totals over every file recorded in a diffstat log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinimizeSummary {
    /// Files recorded, changed or not
    pub total_files: u64,
    /// Files whose minimized form differs from the original
    pub changed_files: u64,
    pub original_lines: u64,
    /// Deleted minus inserted lines
    pub removed_lines: i64,
}

impl MinimizeSummary {
    /// Read and aggregate a log named `diffstat.log`
    pub fn from_log_file(path: &Path) -> Result<Self> {
        let named_right = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with("diffstat.log"));
        if !named_right || !path.is_file() {
            return Err(Error::InvalidInvocation(
                "Please specify diffstat.log file path.".into(),
            ));
        }

        let bytes = fs::read(path)?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Aggregate the log text
    ///
    /// Only lines whose first field is a number are summary lines; per-file
    /// histogram lines start with the file name and are skipped.
    pub fn parse(log: &str) -> Self {
        let mut summary = Self::default();

        for line in log.lines() {
            let starts_with_number = line
                .split_whitespace()
                .next()
                .is_some_and(|first| first.bytes().all(|b| b.is_ascii_digit()));
            if !starts_with_number {
                continue;
            }

            for part in line.split(',') {
                let count = leading_number(part);
                if part.contains("change") {
                    summary.total_files += 1;
                    summary.changed_files += count;
                } else if part.contains("insertion") {
                    summary.removed_lines -= count as i64;
                } else if part.contains("deletion") {
                    summary.removed_lines += count as i64;
                } else if part.contains("origin") {
                    summary.original_lines += count;
                }
            }
        }

        summary
    }

    /// Share of the original lines removed, rounded down
    pub fn percent_removed(&self) -> i64 {
        if self.original_lines == 0 {
            0
        } else {
            100 * self.removed_lines / self.original_lines as i64
        }
    }
}

fn leading_number(part: &str) -> u64 {
    part.split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

impl fmt::Display for MinimizeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} out of {} compiled C files have been minimized.",
            self.changed_files, self.total_files
        )?;
        write!(
            f,
            "Unused {} lines({}% of the original C code) have been removed.",
            self.removed_lines,
            self.percent_removed()
        )
    }
}
