//! Analysis modules.
//!
//! Derives the statistics summary from a raw exam attempt.

pub mod aggregator;
pub mod subjects;
pub mod syllabus;

pub use aggregator::{Aggregator, BreakdownPolicy};
pub use subjects::SubjectTable;
