//! Core Module - Scoring Passes & Aggregation
//!
//! Pure heuristics over the fetched context. Every pass degrades to a
//! documented default instead of failing the pipeline.

pub mod contracts;
pub mod flow;
pub mod gas;
pub mod mev;
pub mod network;
pub mod patterns;
pub mod score;
pub mod vulnerability;

pub use contracts::*;
pub use flow::*;
pub use gas::*;
pub use mev::*;
pub use network::*;
pub use patterns::*;
pub use score::*;
pub use vulnerability::*;
