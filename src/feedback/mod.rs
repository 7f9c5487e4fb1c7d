//! LLM-backed narrative feedback.
//!
//! This module turns the aggregated summary into prompts, sends them to
//! the generative language service and recovers from every failure with
//! fixed fallback content.

pub mod client;
pub mod insights;
pub mod narrator;
pub mod prompt;

pub use client::{GeminiClient, GeminiConfig};
pub use narrator::Narrator;
