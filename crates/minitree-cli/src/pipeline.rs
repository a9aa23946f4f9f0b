//! Per-target minimization
//!
//! Preprocess, track, reconstruct, mirror, report: one target at a time,
//! start to finish. Nothing is shared between targets except the output
//! tree on disk.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use minitree_core::config::VerbatimMatcher;
use minitree_core::{source_lines, Error, MinimizeConfig, Result};
use minitree_output::mirror::is_mirrorable;
use minitree_output::{DiffReport, Reporter, TreeMirror};
use minitree_parser::{
    GccPreprocessor, HeaderTracker, PreprocessOptions, Reconstructor, TrackedSource,
};

pub struct Minimizer {
    source_root: PathBuf,
    verbatim: VerbatimMatcher,
    preprocessor: GccPreprocessor,
    mirror: TreeMirror,
    reporter: Reporter,
}

impl Minimizer {
    pub fn new(config: &MinimizeConfig) -> Result<Self> {
        Ok(Self {
            source_root: PathBuf::from("."),
            verbatim: config.verbatim_matcher()?,
            preprocessor: GccPreprocessor::new(config),
            mirror: TreeMirror::new(&config.output_root),
            reporter: Reporter::new(config),
        })
    }

    /// Resolve target and header paths against `source_root`
    #[cfg(test)]
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = source_root.into();
        self.mirror = self.mirror.with_source_root(&self.source_root);
        self
    }

    /// Minimize the target named by `options`
    pub fn run(&self, options: &PreprocessOptions) -> Result<DiffReport> {
        check_target(&options.target)?;
        self.preprocessor.ensure_available()?;

        let side_file = self.mirror.output_path(&side_file_name(&options.target));
        self.preprocessor.preprocess_to_file(options, &side_file)?;

        let annotated = fs::read(&side_file)?;
        fs::remove_file(&side_file)?;
        self.minimize_annotated(&options.target, &annotated)
    }

    /// Minimize `target` from already captured preprocessor output
    pub fn minimize_annotated(&self, target: &Path, annotated: &[u8]) -> Result<DiffReport> {
        check_target(target)?;
        let tracked = HeaderTracker::new(target)
            .with_verbatim(self.verbatim.clone())
            .track(annotated);
        self.finish(target, tracked)
    }

    fn finish(&self, target: &Path, tracked: TrackedSource) -> Result<DiffReport> {
        let original = fs::read(self.source_root.join(target))?;

        let minimized = match tracked {
            TrackedSource::Verbatim => {
                self.mirror.copy_verbatim(target)?;
                original.clone()
            }
            TrackedSource::Stripped { lines, headers } => {
                for header in &headers {
                    self.mirror.ensure_copied(header)?;
                }
                let original_lines = source_lines(&original);
                let minimized = Reconstructor::new(&original_lines).reconstruct(&lines)?;
                self.mirror.write_file(target, &minimized)?;
                minimized
            }
        };

        let output = self.mirror.output_path(target);
        let report = self
            .reporter
            .record(target, &output, &original, &minimized)?;

        info!(
            "Minimized {:?}: {} of {} lines removed",
            target,
            report.deletions.saturating_sub(report.insertions),
            report.original_lines
        );
        Ok(report)
    }
}

/// The target is written at the same relative path under the output root
fn check_target(target: &Path) -> Result<()> {
    if is_mirrorable(target) {
        Ok(())
    } else {
        Err(Error::InvalidInvocation(format!(
            "target {} must be a relative path inside the source tree",
            target.display()
        )))
    }
}

fn side_file_name(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".preprocessed");
    PathBuf::from(name)
}
