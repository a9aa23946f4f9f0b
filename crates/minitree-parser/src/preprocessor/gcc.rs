//! GCC Preprocessor Integration
//!
//! Wraps `gcc -E -fdirectives-only`: includes are expanded and line
//! markers emitted, while macros stay unexpanded and conditionals visible.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use minitree_core::{Error, MinimizeConfig, Result};

/// Options for one preprocessing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessOptions {
    /// Compiler flags forwarded unchanged, target path last
    pub args: Vec<String>,
    /// Target source file, relative to the source root
    pub target: PathBuf,
}

impl PreprocessOptions {
    /// Build options from a checker-style argument list
    ///
    /// Every occurrence of a flag in `checker_only` is dropped. The last
    /// remaining argument is the target.
    pub fn from_args(args: Vec<String>, checker_only: &[String]) -> Result<Self> {
        let args: Vec<String> = args
            .into_iter()
            .filter(|arg| !checker_only.contains(arg))
            .collect();

        let target = args
            .last()
            .map(PathBuf::from)
            .ok_or_else(|| Error::InvalidInvocation("no target file given".into()))?;

        Ok(Self { args, target })
    }
}

/// GCC preprocessor wrapper
pub struct GccPreprocessor {
    /// Binary name or path, cross prefix included
    binary: String,
}

impl GccPreprocessor {
    /// Create a preprocessor using the configured binary
    pub fn new(config: &MinimizeConfig) -> Self {
        Self::with_binary(config.preprocessor_binary())
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Check if the binary runs
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Fail with a remediation hint if the binary cannot be run
    pub fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            debug!("Found preprocessor: {}", self.binary);
            Ok(())
        } else {
            Err(Error::ToolNotFound {
                tool: self.binary.clone(),
                hint: "Please install gcc in the host machine, or point CROSS_COMPILE/MINITREE_CC at an installed compiler.".into(),
            })
        }
    }

    /// Preprocess the target, writing the annotated output to `side_file`
    pub fn preprocess_to_file(&self, options: &PreprocessOptions, side_file: &Path) -> Result<()> {
        if let Some(parent) = side_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let args = self.build_args(options);
        debug!("Preprocessing {:?} with args: {:?}", options.target, args);

        let result = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::from(File::create(side_file)?))
            .stderr(Stdio::piped())
            .output();

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let _ = fs::remove_file(side_file);
                return Err(match e.kind() {
                    std::io::ErrorKind::NotFound => Error::ToolNotFound {
                        tool: self.binary.clone(),
                        hint: "Please install gcc in the host machine.".into(),
                    },
                    _ => Error::Io(e),
                });
            }
        };

        if !output.status.success() {
            let _ = fs::remove_file(side_file);
            return Err(Error::PreprocessFailed {
                command: self.command_line(options),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }

    /// Build gcc command line arguments
    fn build_args(&self, options: &PreprocessOptions) -> Vec<String> {
        let mut args = vec!["-E".to_string(), "-fdirectives-only".to_string()];
        args.extend(options.args.iter().cloned());
        args
    }

    /// Human-readable command line, for error messages
    pub fn command_line(&self, options: &PreprocessOptions) -> String {
        std::iter::once(self.binary.clone())
            .chain(self.build_args(options))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
