//! Tree Mirror
//!
//! Maintains the output tree, which has the same relative layout as the
//! source tree. Every write goes through a temporary file in the destination
//! directory followed by a rename, so concurrent invocations copying the same
//! header never expose a partially written file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use minitree_core::Result;

/// Writer for the mirrored output tree
#[derive(Debug, Clone)]
pub struct TreeMirror {
    /// Directory relative source paths are resolved against
    source_root: PathBuf,
    root: PathBuf,
}

impl TreeMirror {
    /// Mirror into `root`, reading sources relative to the working directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: PathBuf::from("."),
            root: root.into(),
        }
    }

    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = source_root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `rel` lands in the output tree
    pub fn output_path(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }

    /// Copy a header into the output tree unless there is nothing to do
    ///
    /// Absolute paths, paths escaping the source root, paths already present
    /// in the output tree and paths missing on disk are skipped. Returns
    /// whether a copy was made.
    pub fn ensure_copied(&self, path: &Path) -> Result<bool> {
        if !is_mirrorable(path) {
            debug!("Not mirroring {:?}: outside the source tree", path);
            return Ok(false);
        }

        let dest = self.output_path(path);
        if dest.exists() {
            return Ok(false);
        }
        let source_path = self.source_root.join(path);
        if !source_path.is_file() {
            debug!("Not mirroring {:?}: not found", path);
            return Ok(false);
        }

        let mut source = File::open(&source_path)?;
        write_atomic(&dest, |tmp| io::copy(&mut source, tmp).map(|_| ()))?;
        debug!("Mirrored {:?}", path);
        Ok(true)
    }

    /// Copy a source file unmodified, replacing any earlier output
    pub fn copy_verbatim(&self, rel: &Path) -> Result<()> {
        let mut source = File::open(self.source_root.join(rel))?;
        write_atomic(&self.output_path(rel), |tmp| {
            io::copy(&mut source, tmp).map(|_| ())
        })
    }

    /// Write `content` at `rel` in the output tree
    pub fn write_file(&self, rel: &Path, content: &[u8]) -> Result<()> {
        write_atomic(&self.output_path(rel), |tmp| tmp.write_all(content))
    }
}

/// Relative paths that stay inside the tree
pub fn is_mirrorable(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn write_atomic<F>(dest: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Source tree and output root side by side, as in a kernel build
    struct Fixture {
        _dir: TempDir,
        mirror: TreeMirror,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("include/linux")).unwrap();
        fs::write(src.join("include/linux/foo.h"), "int foo;\n").unwrap();
        fs::write(src.join("quirk.c"), "int quirk; /* kept */\n").unwrap();
        let mirror = TreeMirror::new(dir.path().join("out")).with_source_root(src);
        Fixture { _dir: dir, mirror }
    }

    #[test]
    fn test_is_mirrorable() {
        assert!(is_mirrorable(Path::new("include/linux/foo.h")));
        assert!(is_mirrorable(Path::new("./include/foo.h")));
        assert!(!is_mirrorable(Path::new("/usr/include/stdio.h")));
        assert!(!is_mirrorable(Path::new("../outside.h")));
        assert!(!is_mirrorable(Path::new("include/../../outside.h")));
        assert!(!is_mirrorable(Path::new("")));
    }

    #[test]
    fn test_write_file_creates_directories() {
        let f = fixture();
        f.mirror
            .write_file(Path::new("drivers/usb/core/hub.c"), b"int hub;\n")
            .unwrap();

        let written = fs::read(f.mirror.root().join("drivers/usb/core/hub.c")).unwrap();
        assert_eq!(written, b"int hub;\n");
    }

    #[test]
    fn test_write_file_replaces_content() {
        let f = fixture();
        let rel = Path::new("a.c");
        f.mirror.write_file(rel, b"old\n").unwrap();
        f.mirror.write_file(rel, b"new\n").unwrap();

        assert_eq!(fs::read(f.mirror.output_path(rel)).unwrap(), b"new\n");
    }

    #[test]
    fn test_ensure_copied_is_idempotent() {
        let f = fixture();
        let rel = Path::new("include/linux/foo.h");

        assert!(f.mirror.ensure_copied(rel).unwrap());
        assert!(!f.mirror.ensure_copied(rel).unwrap());
        assert_eq!(fs::read(f.mirror.output_path(rel)).unwrap(), b"int foo;\n");
    }

    #[test]
    fn test_concurrent_ensure_copied() {
        let f = fixture();
        let rel = Path::new("include/linux/foo.h");

        std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    let mirror = f.mirror.clone();
                    scope.spawn(move || mirror.ensure_copied(rel))
                })
                .collect();
            for worker in workers {
                assert!(worker.join().unwrap().is_ok());
            }
        });

        assert_eq!(fs::read(f.mirror.output_path(rel)).unwrap(), b"int foo;\n");
        let entries: Vec<_> = fs::read_dir(f.mirror.root().join("include/linux"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["foo.h"]);
    }

    #[test]
    fn test_ensure_copied_skips() {
        let f = fixture();
        assert!(!f.mirror.ensure_copied(Path::new("/usr/include/stdio.h")).unwrap());
        assert!(!f.mirror.ensure_copied(Path::new("../escape.h")).unwrap());
        assert!(!f.mirror.ensure_copied(Path::new("no/such/header.h")).unwrap());
        assert!(!f.mirror.root().exists());
    }

    #[test]
    fn test_ensure_copied_keeps_existing_output() {
        let f = fixture();
        let rel = Path::new("include/linux/foo.h");
        f.mirror.write_file(rel, b"already here\n").unwrap();

        assert!(!f.mirror.ensure_copied(rel).unwrap());
        assert_eq!(fs::read(f.mirror.output_path(rel)).unwrap(), b"already here\n");
    }

    #[test]
    fn test_copy_verbatim_overwrites() {
        let f = fixture();
        let rel = Path::new("quirk.c");
        f.mirror.write_file(rel, b"stale\n").unwrap();
        f.mirror.copy_verbatim(rel).unwrap();

        assert_eq!(
            fs::read(f.mirror.output_path(rel)).unwrap(),
            b"int quirk; /* kept */\n"
        );
    }
}
