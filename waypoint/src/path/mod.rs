//! Learning path derivation and enrichment.
//!
//! `extract` turns a mermaid mindmap into a flat ordered concept list;
//! `enhance` merges LLM-suggested priorities and resources onto that
//! list, falling back to a deterministic ranking when the LLM output is
//! unusable.

pub mod enhance;
pub mod extract;

pub use enhance::{
    apply_enhancements, build_enhancement_prompt, enhance_nodes, fallback_enrichment,
    run_enhancement, spawn_enhancement, strip_code_fences,
};
pub use extract::extract_concepts;
