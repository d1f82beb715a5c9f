//! Waypoint - backend for an AI-assisted mindmap learning application
//!
//! Waypoint generates mermaid mindmaps with an LLM, derives learning
//! paths from them, enriches path nodes with LLM-suggested priorities
//! and resources, generates per-node quizzes, and tracks daily activity
//! for a streak-based reward mechanism.
//!
//! ## Services
//!
//! - **Mindmap**: LLM-generated mermaid diagrams per (user, topic)
//! - **Learning path**: concept extraction from diagrams + background
//!   LLM enrichment with deterministic fallback
//! - **Quiz**: LLM-generated multiple-choice quizzes per node
//! - **User/Streak**: profiles, daily activity calendar, reward claims

pub mod config;
pub mod db;
pub mod error;
pub mod path;
pub mod routes;
pub mod server;

pub use config::Args;
pub use error::{Result, WaypointError};
pub use server::{run, AppState};
