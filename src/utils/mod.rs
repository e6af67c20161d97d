//! Utils Module - Shared Constants & Helpers

pub mod constants;
pub mod format;

pub use constants::*;
pub use format::*;
