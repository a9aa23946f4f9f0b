//! Line Correlator
//!
//! Decides whether a line of the stripped preprocessor output is an emission
//! of a given original source line. Directives-only preprocessing may strip
//! comments and join backslash continuations, so equality alone is not
//! enough; the rules below are tried in order and the first match wins.

/// The rule that correlated a pair of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationRule {
    /// Stripped line opens a block comment and equals the original
    VerbatimCommentOpen,
    /// Stripped line equals the original up to its first `/*`
    BlockCommentStripped,
    /// Both lines agree up to their `//`
    LineCommentStripped,
    /// Both lines agree once same-line `/* ... */` spans are removed
    InlineCommentRemoved,
    /// Original continuation line is contained in the flattened line
    ContinuationPartial,
}

type Rule = fn(&[u8], &[u8]) -> bool;

/// Rules in priority order
const RULES: &[(CorrelationRule, Rule)] = &[
    (CorrelationRule::VerbatimCommentOpen, verbatim_comment_open),
    (CorrelationRule::BlockCommentStripped, block_comment_stripped),
    (CorrelationRule::LineCommentStripped, line_comment_stripped),
    (CorrelationRule::InlineCommentRemoved, inline_comment_removed),
    (CorrelationRule::ContinuationPartial, continuation_partial),
];

/// First rule correlating `original` with `stripped`, if any
pub fn correlate(original: &[u8], stripped: &[u8]) -> Option<CorrelationRule> {
    RULES
        .iter()
        .find(|(_, holds)| holds(original, stripped))
        .map(|(rule, _)| *rule)
}

fn verbatim_comment_open(original: &[u8], stripped: &[u8]) -> bool {
    trim(stripped).starts_with(b"/*") && squash(stripped) == squash(original)
}

fn block_comment_stripped(original: &[u8], stripped: &[u8]) -> bool {
    squash(stripped) == squash(before(original, b"/*"))
}

fn line_comment_stripped(original: &[u8], stripped: &[u8]) -> bool {
    squash(before(stripped, b"//")) == squash(before(original, b"//"))
}

fn inline_comment_removed(original: &[u8], stripped: &[u8]) -> bool {
    squash(&remove_inline_comments(stripped)) == squash(&remove_inline_comments(original))
}

fn continuation_partial(original: &[u8], stripped: &[u8]) -> bool {
    let Some(content) = continuation_content(original) else {
        return false;
    };
    let needle = squash(content);
    let haystack = squash(stripped);
    contains(&haystack, &needle)
}

/// Content of a backslash-continued line, trailing backslash removed
///
/// Blank lines and lines holding only a backslash do not count.
pub fn continuation_content(line: &[u8]) -> Option<&[u8]> {
    let trimmed = trim(line);
    match trimmed.split_last() {
        Some((b'\\', content)) if !content.is_empty() => Some(content),
        _ => None,
    }
}

/// Whether the line ends with a backslash continuation
pub fn is_continued(line: &[u8]) -> bool {
    trim(line).ends_with(b"\\")
}

/// C whitespace, including vertical tab
pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

/// The line with every whitespace byte removed
pub(crate) fn squash(line: &[u8]) -> Vec<u8> {
    line.iter().copied().filter(|&b| !is_space(b)).collect()
}

pub(crate) fn trim(line: &[u8]) -> &[u8] {
    let start = line.iter().position(|&b| !is_space(b)).unwrap_or(line.len());
    let end = line.iter().rposition(|&b| !is_space(b)).map_or(start, |i| i + 1);
    &line[start..end]
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub(crate) fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}

/// The part of `line` before the first `delimiter`, or the whole line
pub(crate) fn before<'a>(line: &'a [u8], delimiter: &[u8]) -> &'a [u8] {
    find(line, delimiter).map_or(line, |i| &line[..i])
}

/// Remove every `/* ... */` span closed on the same line
///
/// An opener without a closer is left in place.
fn remove_inline_comments(line: &[u8]) -> Vec<u8> {
    let mut out = line.to_vec();
    while let Some(open) = find(&out, b"/*") {
        let Some(close) = find(&out[open + 2..], b"*/") else {
            break;
        };
        out.drain(open..open + 2 + close + 2);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim_comment_open() {
        assert_eq!(
            correlate(b"/* multi-line\n", b"  /* multi-line\n"),
            Some(CorrelationRule::VerbatimCommentOpen)
        );
    }

    #[test]
    fn test_block_comment_stripped() {
        assert_eq!(
            correlate(b"int x = 1; /* note */\n", b"int x = 1;\n"),
            Some(CorrelationRule::BlockCommentStripped)
        );
        assert_eq!(
            correlate(b"static int y; /* starts here\n", b"static int y;\n"),
            Some(CorrelationRule::BlockCommentStripped)
        );
    }

    #[test]
    fn test_line_comment_stripped() {
        assert_eq!(
            correlate(b"int x; // note\n", b"int x; // other\n"),
            Some(CorrelationRule::LineCommentStripped)
        );
    }

    #[test]
    fn test_inline_comment_removed() {
        assert_eq!(
            correlate(b"int /* a */ x /* b */ = 1;\n", b"int x = 1;\n"),
            Some(CorrelationRule::InlineCommentRemoved)
        );
        assert_eq!(
            correlate(b"f(/* a */ 1, /* b */ 2);\n", b"f(  1,   2);\n"),
            Some(CorrelationRule::InlineCommentRemoved)
        );
    }

    #[test]
    fn test_continuation_partial() {
        let flattened = b"#define MAX(a, b) ((a) > (b) ? (a) : (b))\n";
        assert_eq!(
            correlate(b"#define MAX(a, b) \\\n", flattened),
            Some(CorrelationRule::ContinuationPartial)
        );
        assert_eq!(
            correlate(b"\t((a) > (b) ? \\\n", flattened),
            Some(CorrelationRule::ContinuationPartial)
        );
        assert_eq!(correlate(b"\t(a) + (b) \\\n", flattened), None);
    }

    #[test]
    fn test_lone_backslash_is_not_continuation_content() {
        assert_eq!(continuation_content(b"   \\\n"), None);
        assert_eq!(continuation_content(b"\n"), None);
        assert_eq!(continuation_content(b"a \\\n"), Some(&b"a "[..]));
        assert_eq!(correlate(b"   \\\n", b"int z;\n"), None);
    }

    #[test]
    fn test_priority_order() {
        // Both the first and second rules hold; the first wins.
        assert_eq!(
            correlate(b"/* whole */\n", b"/* whole */\n"),
            Some(CorrelationRule::VerbatimCommentOpen)
        );
    }

    #[test]
    fn test_unrelated_lines() {
        assert_eq!(correlate(b"int a;\n", b"int b;\n"), None);
        assert_eq!(correlate(b"#include <linux/kernel.h>\n", b"int b;\n"), None);
    }

    #[test]
    fn test_helpers() {
        assert_eq!(trim(b" \t a b \r\n"), b"a b");
        assert_eq!(trim(b"  \n"), b"");
        assert_eq!(squash(b" a\x0bb\tc \n"), b"abc");
        assert_eq!(before(b"x = 1; // y", b"//"), b"x = 1; ");
        assert_eq!(before(b"x = 1;", b"//"), b"x = 1;");
        assert_eq!(remove_inline_comments(b"a /* b */ c /* d"), b"a  c /* d");
        assert!(is_continued(b"#define A \\\r\n"));
    }
}
