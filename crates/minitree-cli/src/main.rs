//! minitree CLI
//!
//! Static-checker hook for the kernel build: writes a minimized copy of each
//! compiled C file under the output root, or summarizes a diffstat log.

mod invocation;
mod pipeline;

use std::fmt::Display;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use invocation::{Cli, Invocation, USAGE};
use minitree_core::MinimizeConfig;
use minitree_output::MinimizeSummary;
use minitree_parser::PreprocessOptions;
use pipeline::Minimizer;

fn main() -> Result<()> {
    // Logs go to stderr so the build's own output stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MINITREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match Invocation::classify(cli.args)? {
        Invocation::Help => {
            print_stdout(USAGE)?;
        }
        Invocation::Summary(path) => {
            let summary = MinimizeSummary::from_log_file(&path)?;
            print_stdout(summary)?;
        }
        Invocation::Minimize {
            output_root,
            compiler_args,
        } => {
            let mut config = MinimizeConfig::from_env();
            if let Some(root) = output_root {
                config.output_root = root;
            }

            let options = PreprocessOptions::from_args(compiler_args, &config.checker_only_flags)?;
            let minimizer = Minimizer::new(&config)?;
            minimizer
                .run(&options)
                .with_context(|| format!("Failed to minimize {}", options.target.display()))?;
        }
    }

    Ok(())
}

fn print_stdout(text: impl Display) -> io::Result<()> {
    write_line(&mut io::stdout().lock(), text)
}

/// A reader that closed the pipe early, as in `minitree -h | head`, is not an error
fn write_line(out: &mut impl Write, text: impl Display) -> io::Result<()> {
    match writeln!(out, "{}", text) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result,
    }
}
