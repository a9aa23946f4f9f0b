//! Reconstructor
//!
//! Replays the stripped lines against the original file. Lines that survived
//! preprocessing unchanged are copied; altered lines are re-anchored with the
//! correlator and restored from the original; include placeholders are
//! resolved back to the original `#include` directive.

use std::path::Path;
use tracing::{debug, trace};

use minitree_core::{Error, Result, SourceLine, StrippedLine};

use crate::correlate::{before, contains, correlate, is_continued, is_space, squash, trim};

/// Rebuilds one minimized file from its original lines
pub struct Reconstructor<'a> {
    original: &'a [SourceLine],
    /// Index of the next original line to read
    cursor: usize,
}

impl<'a> Reconstructor<'a> {
    pub fn new(original: &'a [SourceLine]) -> Self {
        Self {
            original,
            cursor: 0,
        }
    }

    /// Produce the minimized file content
    pub fn reconstruct(mut self, stripped: &[StrippedLine]) -> Result<Vec<u8>> {
        let original = self.original;
        let mut out = Vec::new();

        for line in stripped {
            // Every stripped line consumes the original line under the cursor.
            let start = self.cursor;
            let current = original.get(start);
            if current.is_some() {
                self.cursor += 1;
            }

            match line {
                StrippedLine::Literal(text) => {
                    if current.is_some_and(|org| org == text) {
                        out.extend_from_slice(text);
                    } else if !trim(text).is_empty() {
                        let org = self.scan_correlated(start, text)?;
                        emit_restored(&mut out, org, text);
                    }
                    // Blank lines left behind by elision are dropped.
                }
                StrippedLine::IncludePlaceholder(header) => {
                    let org = self.scan_include(start, header)?;
                    emit_include(&mut out, org);
                }
            }
        }

        Ok(out)
    }

    /// Advance from `start` to the first original line correlated with `text`
    fn scan_correlated(&mut self, start: usize, text: &[u8]) -> Result<&'a [u8]> {
        let original = self.original;
        for (index, org) in original.iter().enumerate().skip(start) {
            if let Some(rule) = correlate(org, text) {
                trace!(?rule, line = index + 1, "re-anchored");
                self.cursor = index + 1;
                return Ok(org.as_slice());
            }
        }

        Err(Error::UnreconcilableLine {
            line: start + 1,
            stripped: String::from_utf8_lossy(text).into_owned(),
        })
    }

    /// Find the `#include` for `header`, wrapping to the top of the file once
    fn scan_include(&mut self, start: usize, header: &Path) -> Result<&'a [u8]> {
        let original = self.original;
        let header_name = header.to_string_lossy();
        let mut index = start;
        let mut wrapped = false;

        loop {
            if index >= original.len() {
                if wrapped {
                    return Err(Error::IncludeNotFound {
                        header: header.to_path_buf(),
                    });
                }
                debug!("Wrapping to the top of the file to find {:?}", header);
                wrapped = true;
                index = 0;
                continue;
            }

            if includes_header(&original[index], header_name.as_bytes()) {
                debug!("Restored include of {:?} from line {}", header, index + 1);
                self.cursor = index + 1;
                return Ok(original[index].as_slice());
            }
            index += 1;
        }
    }
}

/// Whether `line` is an `#include` naming a suffix of `header_path`
///
/// Whitespace inside the directive is ignored, so `# include <linux/fs.h>`
/// counts. A computed include such as `#include HDR` matches any header,
/// since the macro's expansion is not visible in the original line.
pub fn includes_header(line: &[u8], header_path: &[u8]) -> bool {
    let Some(operand) = include_operand(line) else {
        return false;
    };
    let close = match operand.first() {
        Some(b'<') => b'>',
        Some(b'"') => b'"',
        Some(&b) if b == b'_' || b.is_ascii_alphabetic() => return true,
        _ => return false,
    };
    let name = &operand[1..];
    match name.iter().position(|&b| b == close) {
        Some(end) if end > 0 => header_path.ends_with(&name[..end]),
        _ => false,
    }
}

/// Operand of an `#include` directive, with whitespace removed
fn include_operand(line: &[u8]) -> Option<Vec<u8>> {
    let rest = trim(line).strip_prefix(b"#")?;
    let rest = trim(rest).strip_prefix(b"include")?;
    match rest.first() {
        Some(&b) if is_space(b) || b == b'<' || b == b'"' => Some(squash(rest)),
        _ => None,
    }
}

/// Write an include line, cutting off a block comment left open at its end
fn emit_include(out: &mut Vec<u8>, org: &[u8]) {
    if contains(org, b"/*") && !contains(org, b"*/") {
        emit_truncated(out, org);
    } else {
        out.extend_from_slice(org);
    }
}

/// Write the restored form of an original line correlated with `stripped`
fn emit_restored(out: &mut Vec<u8>, org: &[u8], stripped: &[u8]) {
    if is_continued(org) {
        // Multi-line macros stay in their flattened form.
        out.extend_from_slice(stripped);
    } else if !contains(org, b"/*") || trim(org).starts_with(b"/*") || contains(org, b"*/") {
        out.extend_from_slice(org);
    } else {
        emit_truncated(out, org);
    }
}

/// Write `org` up to its first `/*`, keeping indentation and line ending
fn emit_truncated(out: &mut Vec<u8>, org: &[u8]) {
    let code = before(org, b"/*");
    let end = code.iter().rposition(|&b| !is_space(b)).map_or(0, |i| i + 1);
    out.extend_from_slice(&code[..end]);
    out.extend_from_slice(line_ending(org));
}

fn line_ending(line: &[u8]) -> &'static [u8] {
    if line.ends_with(b"\r\n") {
        b"\r\n"
    } else if line.ends_with(b"\n") {
        b"\n"
    } else {
        b""
    }
}
