//! Line marker parsing
//!
//! GCC reports the origin of the following output line with markers such as
//! `# 1 "include/linux/kernel.h" 1 3`. Flag `2` means the stream is returning
//! to the named file after finishing an include made directly from it.

use regex::bytes::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

use minitree_core::{LineMarker, MarkerFlags};

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?-u)^# ([0-9]+) "((?:[^"\\]|\\.)*)"((?: [0-9]+)*)[ \t\r\n]*$"#).unwrap()
    })
}

/// Parse a line marker, returning `None` for ordinary content lines
pub fn parse_line_marker(line: &[u8]) -> Option<LineMarker> {
    let caps = marker_pattern().captures(line)?;

    let line_number = std::str::from_utf8(&caps[1]).ok()?.parse().ok()?;
    let file_path = PathBuf::from(String::from_utf8_lossy(&unescape(&caps[2])).into_owned());
    let flags = MarkerFlags::from_digits(
        caps[3]
            .split(|&b| b == b' ')
            .filter_map(|digits| std::str::from_utf8(digits).ok()?.parse::<u8>().ok()),
    );

    Some(LineMarker {
        line_number,
        file_path,
        flags,
    })
}

/// Undo GCC's escaping of `\` and `"` inside marker paths
fn unescape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied();
    while let Some(b) = bytes.next() {
        if b == b'\\' {
            if let Some(escaped) = bytes.next() {
                out.push(escaped);
                continue;
            }
        }
        out.push(b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_marker() {
        let marker = parse_line_marker(b"# 1 \"drivers/usb/core/hub.c\"\n").unwrap();
        assert_eq!(marker.line_number, 1);
        assert_eq!(marker.file_path, PathBuf::from("drivers/usb/core/hub.c"));
        assert_eq!(marker.flags, MarkerFlags::default());
    }

    #[test]
    fn test_marker_flags() {
        let marker = parse_line_marker(b"# 42 \"/usr/include/stdio.h\" 2 3 4\n").unwrap();
        assert_eq!(marker.line_number, 42);
        assert!(marker.flags.returning_to_file);
        assert!(marker.flags.system_header);
        assert!(marker.flags.extern_c);
        assert!(!marker.flags.new_file);
    }

    #[test]
    fn test_builtin_pseudo_files() {
        let marker = parse_line_marker(b"# 1 \"<command-line>\" 2\r\n").unwrap();
        assert_eq!(marker.file_path, PathBuf::from("<command-line>"));
        assert!(marker.flags.returning_to_file);
    }

    #[test]
    fn test_escaped_path() {
        let marker = parse_line_marker(br#"# 3 "odd \"name\".h" 1"#).unwrap();
        assert_eq!(marker.file_path, PathBuf::from("odd \"name\".h"));
        assert!(marker.flags.new_file);
    }

    #[test]
    fn test_content_lines_are_not_markers() {
        assert!(parse_line_marker(b"#define FOO 1\n").is_none());
        assert!(parse_line_marker(b"# define FOO \"x\"\n").is_none());
        assert!(parse_line_marker(b"#include \"foo.h\"\n").is_none());
        assert!(parse_line_marker(b"# 12 foo.h\n").is_none());
        assert!(parse_line_marker(b"int x; # 1 \"a.c\"\n").is_none());
    }
}
