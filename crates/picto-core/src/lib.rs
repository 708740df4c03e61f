//! Picto Core crate - Shared types, errors, configuration, and logging setup.
//!
//! Everything here is consumed by the capture, speech, and chat crates.
//! Subsystem crates define their own error types and convert through
//! `PictoError` so the `?` operator works across crate boundaries.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::PictoConfig;
pub use error::{PictoError, Result};
pub use types::*;
