//! LLM completion clients for Waypoint.
//!
//! Waypoint treats the language model as an untrusted text-completion
//! service: it sends a prompt string and gets a string back, with no
//! schema guarantee on the output. This crate provides the `LlmClient`
//! trait plus two implementations:
//!
//! - `OpenAiClient`: any OpenAI-compatible chat-completions API
//!   (OpenAI, Ollama, vLLM, LocalAI, ...)
//! - `MockLlm`: scripted responses for tests

pub mod client;
pub mod mock;
pub mod openai;

pub use client::{LlmClient, LlmError};
pub use mock::MockLlm;
pub use openai::OpenAiClient;
