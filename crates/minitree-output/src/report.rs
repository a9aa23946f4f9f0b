//! Minimization accounting
//!
//! For each minimized file, appends a unified diff to the patch log and a
//! diffstat block plus the original line count to the diffstat log. Both
//! logs accumulate across invocations.

use encoding_rs::WINDOWS_1252;
use similar::{ChangeTag, TextDiff};
use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use minitree_core::{MinimizeConfig, Result};

/// Widest histogram bar in a diffstat line
const MAX_BAR_WIDTH: usize = 60;

/// Differences between an original file and its minimized form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub insertions: usize,
    pub deletions: usize,
    pub original_lines: usize,
    /// `diff -u` style text; empty when the files are identical
    pub unified: String,
}

impl DiffReport {
    pub fn compute(
        original_label: &str,
        minimized_label: &str,
        original: &[u8],
        minimized: &[u8],
    ) -> Self {
        let original = decode_best_effort(original);
        let minimized = decode_best_effort(minimized);
        let diff = TextDiff::from_lines(original.as_ref(), minimized.as_ref());

        let mut insertions = 0;
        let mut deletions = 0;
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        let unified = diff
            .unified_diff()
            .context_radius(3)
            .header(original_label, minimized_label)
            .to_string();

        Self {
            insertions,
            deletions,
            original_lines: original.lines().count(),
            unified,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }

    /// The block appended to the diffstat log for `name`
    pub fn diffstat(&self, name: &str) -> String {
        let mut out = String::new();
        if self.is_unchanged() {
            out.push_str(" 0 files changed\n");
        } else {
            let total = self.insertions + self.deletions;
            let (plus, minus) = if total > MAX_BAR_WIDTH {
                let plus = self.insertions * MAX_BAR_WIDTH / total;
                (plus, MAX_BAR_WIDTH - plus)
            } else {
                (self.insertions, self.deletions)
            };
            out.push_str(&format!(
                " {name} | {total:>4} {}{}\n",
                "+".repeat(plus),
                "-".repeat(minus)
            ));

            let mut parts = vec!["1 file changed".to_string()];
            if self.insertions > 0 {
                parts.push(plural(self.insertions, "insertion", "(+)"));
            }
            if self.deletions > 0 {
                parts.push(plural(self.deletions, "deletion", "(-)"));
            }
            out.push_str(&format!(" {}\n", parts.join(", ")));
        }
        out.push_str(&format!(" {} lines in the origin\n", self.original_lines));
        out
    }
}

fn plural(count: usize, noun: &str, sign: &str) -> String {
    let s = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{s}{sign}")
}

/// Decode as UTF-8, falling back to Windows-1252
fn decode_best_effort(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (res, _, _) = WINDOWS_1252.decode(bytes);
            res
        }
    }
}

/// Appends per-file reports to the accumulated logs
#[derive(Debug, Clone)]
pub struct Reporter {
    patch_log: PathBuf,
    diffstat_log: PathBuf,
}

impl Reporter {
    pub fn new(config: &MinimizeConfig) -> Self {
        Self {
            patch_log: config.patch_log_path(),
            diffstat_log: config.diffstat_log_path(),
        }
    }

    pub fn patch_log(&self) -> &Path {
        &self.patch_log
    }

    pub fn diffstat_log(&self) -> &Path {
        &self.diffstat_log
    }

    /// Diff `original` against `minimized` and append the results to both logs
    pub fn record(
        &self,
        target: &Path,
        output: &Path,
        original: &[u8],
        minimized: &[u8],
    ) -> Result<DiffReport> {
        let report = DiffReport::compute(
            &target.to_string_lossy(),
            &output.to_string_lossy(),
            original,
            minimized,
        );

        append(&self.patch_log, report.unified.as_bytes())?;
        append(
            &self.diffstat_log,
            report.diffstat(&target.to_string_lossy()).as_bytes(),
        )?;

        debug!(
            "{:?}: {} deletions, {} insertions",
            target, report.deletions, report.insertions
        );
        Ok(report)
    }
}

/// Append `chunk` with a single write so concurrent writers do not interleave
fn append(path: &Path, chunk: &[u8]) -> Result<()> {
    if chunk.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(chunk)?;
    Ok(())
}
