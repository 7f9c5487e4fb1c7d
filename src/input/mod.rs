//! Input loading.
//!
//! Reads the exam-attempt export produced by the test platform.

pub mod loader;

pub use loader::load_attempt;
