//! # Brain Module
//!
//! Fast, non-LLM analysis for NeuroGen.
//! Analyzes the user message BEFORE calling the completion provider.
//!
//! ## Components
//! - `signals`: Risk, mood, match psychology and football intent (regex tables)
//! - `memory`: Bounded conversation memory and signal history
//! - `router`: Chat / football / hybrid routing
//! - `prompt`: System prompt composition
//! - `context_packet`: Output data structure
//! - `analyzer`: Main orchestrator

pub mod analyzer;
pub mod context_packet;
pub mod memory;
pub mod prompt;
pub mod router;
pub mod signals;

// Re-export the entry points used by the supervisor
pub use analyzer::BrainAnalyzer;
pub use prompt::PromptComposer;
