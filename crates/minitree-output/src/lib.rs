//! minitree Output
//!
//! Everything written under the output root: the mirrored tree of minimized
//! sources and headers, and the accumulated diff and diffstat logs.
//!
//! ## Modules
//!
//! - `mirror` - Atomic, idempotent writes into the mirrored tree
//! - `report` - Unified diff and diffstat accounting per minimized file
//! - `summary` - Aggregation of an accumulated diffstat log

pub mod mirror;
pub mod report;
pub mod summary;

pub use mirror::TreeMirror;
pub use report::{DiffReport, Reporter};
pub use summary::MinimizeSummary;
