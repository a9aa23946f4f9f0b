//! Configuration types

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Output root used when no `-mindir` is given
pub const DEFAULT_OUTPUT_ROOT: &str = "../minimized-tree";

/// Flags present in a static-checker invocation that the real
/// preprocessor does not understand
pub const CHECKER_ONLY_FLAGS: &[&str] = &["-Wbitwise", "-D__STDC__", "-Wno-return-void"];

/// Sources that are compiled into several objects with differing
/// conditional-compilation settings; their minimized form would only be
/// valid for one of them, so they are mirrored untouched.
pub const DEFAULT_VERBATIM_PATTERNS: &[&str] = &["**/boot/compressed/*.c", "lib/decompress_*.c"];

/// minitree configuration
#[derive(Debug, Clone)]
pub struct MinimizeConfig {
    /// Root of the mirrored, minimized tree
    pub output_root: PathBuf,

    /// Preprocessor binary name, without the cross prefix
    pub compiler: String,

    /// Cross-compilation prefix prepended to `compiler`
    pub tool_prefix: String,

    /// Arguments removed before the preprocessor is invoked
    pub checker_only_flags: Vec<String>,

    /// Globs (relative to the source root) of files copied verbatim
    pub verbatim_patterns: Vec<String>,

    /// Name of the accumulated unified diff log under `output_root`
    pub patch_log_name: String,

    /// Name of the accumulated diffstat log under `output_root`
    pub diffstat_log_name: String,
}

impl Default for MinimizeConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            compiler: "gcc".into(),
            tool_prefix: String::new(),
            checker_only_flags: CHECKER_ONLY_FLAGS.iter().map(|s| s.to_string()).collect(),
            verbatim_patterns: DEFAULT_VERBATIM_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            patch_log_name: "minimize.patch".into(),
            diffstat_log_name: "diffstat.log".into(),
        }
    }
}

impl MinimizeConfig {
    /// Defaults refined by `CROSS_COMPILE`, `MINITREE_CC` and `MINITREE_VERBATIM`
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup("CROSS_COMPILE") {
            self.tool_prefix = prefix;
        }
        if let Some(cc) = lookup("MINITREE_CC").filter(|cc| !cc.trim().is_empty()) {
            self.compiler = cc.trim().to_string();
        }
        if let Some(extra) = lookup("MINITREE_VERBATIM") {
            self.verbatim_patterns.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from),
            );
        }
        self
    }

    /// Full preprocessor binary name, e.g. `aarch64-linux-gnu-gcc`
    pub fn preprocessor_binary(&self) -> String {
        format!("{}{}", self.tool_prefix, self.compiler)
    }

    /// Compile `verbatim_patterns` into a matcher
    pub fn verbatim_matcher(&self) -> Result<VerbatimMatcher> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.verbatim_patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| Error::Config(format!("invalid verbatim pattern {pattern:?}: {e}")))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| Error::Config(format!("invalid verbatim patterns: {e}")))?;
        Ok(VerbatimMatcher { set })
    }

    pub fn patch_log_path(&self) -> PathBuf {
        self.output_root.join(&self.patch_log_name)
    }

    pub fn diffstat_log_path(&self) -> PathBuf {
        self.output_root.join(&self.diffstat_log_name)
    }
}

/// Matches targets that must bypass header elision
#[derive(Debug, Clone)]
pub struct VerbatimMatcher {
    set: GlobSet,
}

impl VerbatimMatcher {
    /// A matcher that never matches
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    pub fn is_verbatim(&self, target: &Path) -> bool {
        let normalized = target.strip_prefix("./").unwrap_or(target);
        self.set.is_match(normalized)
    }
}
