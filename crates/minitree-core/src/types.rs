//! Core data types for minitree

use std::path::PathBuf;

/// One line of the original target file, terminator included
pub type SourceLine = Vec<u8>;

/// Split a file's bytes into lines, keeping each line's terminator
pub fn source_lines(content: &[u8]) -> Vec<SourceLine> {
    content
        .split_inclusive(|&b| b == b'\n')
        .map(|line| line.to_vec())
        .collect()
}

/// Flags trailing a GCC line marker
///
/// The digits follow the GCC dialect: `1` entering a new file, `2`
/// returning to a file after an include, `3` system header, `4` the
/// following text is wrapped in `extern "C"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerFlags {
    pub new_file: bool,
    pub returning_to_file: bool,
    pub system_header: bool,
    pub extern_c: bool,
}

impl MarkerFlags {
    /// Build flags from the marker's trailing digits, ignoring unknown ones
    pub fn from_digits<I: IntoIterator<Item = u8>>(digits: I) -> Self {
        let mut flags = Self::default();
        for digit in digits {
            match digit {
                1 => flags.new_file = true,
                2 => flags.returning_to_file = true,
                3 => flags.system_header = true,
                4 => flags.extern_c = true,
                _ => {}
            }
        }
        flags
    }
}

/// A preprocessor line marker: `# 12 "path/to/file.h" 2 3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarker {
    pub line_number: u64,
    pub file_path: PathBuf,
    pub flags: MarkerFlags,
}

/// One element of the reduced per-target line sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrippedLine {
    /// Content copied verbatim from the target's own output region
    Literal(Vec<u8>),
    /// A header body was elided here; carries the header's marker path
    IncludePlaceholder(PathBuf),
}

impl StrippedLine {
    pub fn literal(text: impl Into<Vec<u8>>) -> Self {
        StrippedLine::Literal(text.into())
    }

    pub fn placeholder(path: impl Into<PathBuf>) -> Self {
        StrippedLine::IncludePlaceholder(path.into())
    }
}
