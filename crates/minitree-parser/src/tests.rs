//! End-to-end tests for tracking and reconstruction
//!
//! Each scenario pairs an original C file with the annotated output GCC
//! produces for it in directives-only mode.

use super::*;
use minitree_core::{source_lines, StrippedLine};
use pretty_assertions::assert_eq;

fn minimize(target: &str, original: &str, annotated: &str) -> String {
    let TrackedSource::Stripped { lines, .. } = HeaderTracker::new(target).track(annotated.as_bytes())
    else {
        panic!("unexpected verbatim result");
    };
    let original = source_lines(original.as_bytes());
    let out = Reconstructor::new(&original).reconstruct(&lines).unwrap();
    String::from_utf8(out).unwrap()
}

/// Test a top-level quoted include round-trips byte for byte
#[test]
fn test_include_round_trip() {
    let original = r#"#include "h.h"

int main(void)
{
	return H_VALUE;
}
"#;
    let annotated = r#"# 1 "src/main.c"
# 1 "<built-in>"
# 1 "<command-line>"
# 1 "/usr/include/stdc-predef.h" 1 3 4
# 1 "<command-line>" 2
# 1 "src/main.c"
# 1 "src/h.h" 1
#define H_VALUE 42
# 2 "src/main.c" 2

int main(void)
{
	return H_VALUE;
}
"#;

    assert_eq!(minimize("src/main.c", original, annotated), original);
}

/// Test a file without comments or macros passes through unchanged
#[test]
fn test_plain_file_passes_through() {
    let original = "static int counter;\n\nvoid tick(void)\n{\n\tcounter++;\n}\n";
    let annotated = format!("# 1 \"tick.c\"\n{original}");

    assert_eq!(minimize("tick.c", original, &annotated), original);
}

/// Test comments removed by the preprocessor are restored
#[test]
fn test_comments_restored() {
    let original = r#"#include <linux/kernel.h>
int x = 1; /* note */
int y = 2; // trailing
"#;
    let annotated = r#"# 1 "drivers/misc/x.c"
# 1 "include/linux/kernel.h" 1
# 1 "include/linux/types.h" 1
typedef int s32;
# 2 "include/linux/kernel.h" 2
extern int printk(const char *fmt, ...);
# 2 "drivers/misc/x.c" 2
int x = 1;
int y = 2;
"#;

    assert_eq!(minimize("drivers/misc/x.c", original, annotated), original);
}

/// Test a three-line macro is emitted once in flattened form
#[test]
fn test_multiline_macro_flattened() {
    let original = "#define SWAP(a, b) \\\n\tdo { typeof(a) t = a; \\\n\ta = b; b = t; } while (0)\nint n;\n";
    let annotated = "# 1 \"swap.c\"\n#define SWAP(a, b) do { typeof(a) t = a; a = b; b = t; } while (0)\n\n\nint n;\n";

    assert_eq!(
        minimize("swap.c", original, annotated),
        "#define SWAP(a, b) do { typeof(a) t = a; a = b; b = t; } while (0)\nint n;\n"
    );
}

/// Test conditionals stay visible and nested includes collapse to one line
#[test]
fn test_conditional_and_nested_includes() {
    let original = r#"#include "outer.h"
#ifdef CONFIG_FOO
#include <foo.h>
#endif
int f;
"#;
    let annotated = r#"# 1 "a.c"
# 1 "outer.h" 1
# 1 "inner.h" 1
int inner;
# 2 "outer.h" 2
int outer;
# 2 "a.c" 2
#ifdef CONFIG_FOO
# 1 "include/foo.h" 1
int foo;
# 4 "a.c" 2
#endif
int f;
"#;

    assert_eq!(minimize("a.c", original, annotated), original);
}

/// Test running twice on the same input yields identical output
#[test]
fn test_reconstruction_is_deterministic() {
    let original = "#include \"h.h\"\nint a; /* c */\n";
    let annotated = "# 1 \"t.c\"\n# 1 \"h.h\" 1\nint h;\n# 2 \"t.c\" 2\nint a;\n";

    let first = minimize("t.c", original, annotated);
    let second = minimize("t.c", original, annotated);
    assert_eq!(first, second);
    assert_eq!(first, original);
}

/// Test nothing from a header leaks into the stripped lines
#[test]
fn test_header_content_never_stripped_in() {
    let annotated = "# 1 \"t.c\"\n# 1 \"h.h\" 1\nint secret;\n# 2 \"t.c\" 2\nint a;\n";
    let TrackedSource::Stripped { lines, .. } = HeaderTracker::new("t.c").track(annotated.as_bytes())
    else {
        panic!("unexpected verbatim result");
    };

    assert!(!lines.contains(&StrippedLine::literal("int secret;\n")));
}
