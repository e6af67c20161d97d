//! Models Module - Data Structures & Errors

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
