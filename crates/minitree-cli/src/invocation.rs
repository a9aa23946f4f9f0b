//! Invocation classification
//!
//! The binary is called by the kernel build as its static checker, so it
//! receives the compiler's flags with the target file last. `-mindir <dir>`
//! may appear anywhere in that list and is ours, not the compiler's.

use clap::Parser;
use std::path::PathBuf;

use minitree_core::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "minitree", disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Compiler flags ending with the target file, or a diffstat.log path
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// What the argument list asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    /// Aggregate a previously accumulated diffstat log
    Summary(PathBuf),
    Minimize {
        output_root: Option<PathBuf>,
        /// Remaining flags, target last
        compiler_args: Vec<String>,
    },
}

impl Invocation {
    pub fn classify(mut args: Vec<String>) -> Result<Self> {
        if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
            return Ok(Invocation::Help);
        }
        if args.len() == 1 {
            return Ok(Invocation::Summary(PathBuf::from(&args[0])));
        }

        let mut output_root = None;
        while let Some(pos) = args.iter().position(|a| a == "-mindir") {
            if pos + 1 >= args.len() {
                return Err(Error::InvalidInvocation(
                    "-mindir requires a directory".into(),
                ));
            }
            let dir = args.remove(pos + 1);
            args.remove(pos);
            output_root = Some(PathBuf::from(dir));
        }

        if args.is_empty() {
            return Err(Error::InvalidInvocation("no target file given".into()));
        }

        Ok(Invocation::Minimize {
            output_root,
            compiler_args: args,
        })
    }
}

pub const USAGE: &str = "\
please use Makefile in the source tree.
usage:
 export PATH=$PATH:<directory containing minitree>
 make C=1 CHECK=minitree CF=\"-mindir ../minimized-tree/\"

use C=1 to perform minimization only for (re)compilation target files.
use C=2 to perform minimization for all the source files regardless of whether they are compilation target or not.
C, CHECK flags are mandatory. -mindir option in CF flag is optional, the default minimized tree location is \"../minimized-tree\"

set CROSS_COMPILE to use a cross compiler's preprocessor.
run `minitree <output root>/diffstat.log` to print the minimization summary.";
