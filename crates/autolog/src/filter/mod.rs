//! Filter — activity name / error status filtering of stored records.

pub mod engine;

pub use engine::{ErrorDisposition, FilterEngine, FilterError, FilterSpec};
