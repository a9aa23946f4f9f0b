//! Line-Marker Header Tracker
//!
//! Walks the annotated preprocessor output and keeps only the lines that
//! belong to the target file. Where the stream returns to the target after
//! a header, an include placeholder records which header was elided.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use minitree_core::config::VerbatimMatcher;
use minitree_core::StrippedLine;

use super::markers::parse_line_marker;

/// What the tracker produced for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackedSource {
    /// Header bodies removed, placeholders in their place
    Stripped {
        lines: Vec<StrippedLine>,
        /// Every real file named by a marker other than the target
        headers: BTreeSet<PathBuf>,
    },
    /// The target must be mirrored without any elision
    Verbatim,
}

/// Header tracker for one target file
pub struct HeaderTracker {
    target: PathBuf,
    verbatim: VerbatimMatcher,
}

impl HeaderTracker {
    /// Create a tracker for `target`, as spelled on the compiler command line
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            verbatim: VerbatimMatcher::empty(),
        }
    }

    /// Targets matching `matcher` bypass tracking altogether
    pub fn with_verbatim(mut self, matcher: VerbatimMatcher) -> Self {
        self.verbatim = matcher;
        self
    }

    /// Reduce annotated output to the target's stripped lines
    pub fn track(&self, annotated: &[u8]) -> TrackedSource {
        if self.verbatim.is_verbatim(&self.target) {
            debug!("{:?} is mirrored verbatim", self.target);
            return TrackedSource::Verbatim;
        }

        let mut lines = Vec::new();
        let mut headers = BTreeSet::new();
        let mut writing_target = false;
        let mut last_seen: Option<PathBuf> = None;

        for line in annotated.split_inclusive(|&b| b == b'\n') {
            let Some(marker) = parse_line_marker(line) else {
                if writing_target {
                    lines.push(StrippedLine::literal(line));
                }
                continue;
            };

            writing_target = marker.file_path == self.target;

            if writing_target && marker.flags.returning_to_file {
                match last_seen.take() {
                    Some(header) => {
                        debug!("Header {:?} elided at line {}", header, marker.line_number);
                        lines.push(StrippedLine::IncludePlaceholder(header));
                    }
                    None => warn!(
                        "Return marker at line {} of {:?} without a preceding header",
                        marker.line_number, self.target
                    ),
                }
            }

            if !writing_target && !is_pseudo_file(&marker.file_path) {
                headers.insert(marker.file_path.clone());
            }

            last_seen = Some(marker.file_path);
        }

        TrackedSource::Stripped { lines, headers }
    }
}

/// `<built-in>`, `<command-line>` and friends
fn is_pseudo_file(path: &Path) -> bool {
    path.to_string_lossy().starts_with('<')
}
