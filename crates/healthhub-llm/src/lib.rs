//! Generative-language adapter for the HealthHub assistant.
//!
//! This crate forwards chat questions and advisory requests (interaction
//! checks, dosage calculation, prescription scans) to a remote
//! text-generation service. Remote failures never escape the advisory API;
//! they degrade to fixed fallback replies.

pub mod advisor;
pub mod chat;
pub mod client;
pub mod config;
pub mod prompts;

pub use advisor::*;
pub use chat::*;
pub use client::*;
pub use config::*;
pub use prompts::*;
