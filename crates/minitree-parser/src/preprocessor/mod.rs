//! C Preprocessor Integration
//!
//! Runs GCC in directives-only mode and follows its line markers to
//! separate the target's own text from expanded header bodies.

pub mod gcc;
pub mod markers;
pub mod tracker;

pub use gcc::{GccPreprocessor, PreprocessOptions};
pub use markers::parse_line_marker;
pub use tracker::{HeaderTracker, TrackedSource};
