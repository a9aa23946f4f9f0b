//! minitree Core
//!
//! Data model, error type and configuration shared by the minitree crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::MinimizeConfig;
pub use error::{Error, Result};
pub use types::*;
