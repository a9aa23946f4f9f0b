//! minitree Parser
//!
//! Turns GCC's directives-only output back into the original source with
//! header bodies replaced by their `#include` lines.
//!
//! ## Modules
//!
//! - `preprocessor` - GCC invocation, line-marker parsing and header tracking
//! - `correlate` - Decides whether a stripped line came from an original line
//! - `reconstruct` - Re-synchronises the stripped lines with the original file

pub mod correlate;
pub mod preprocessor;
pub mod reconstruct;

pub use correlate::{correlate, CorrelationRule};
pub use preprocessor::{GccPreprocessor, HeaderTracker, PreprocessOptions, TrackedSource};
pub use reconstruct::Reconstructor;

#[cfg(test)]
mod tests;
