//! # Actors
//!
//! The supervisor actor and the external collaborators it drives.
//!
//! ## Components
//! - `traits`: `CompletionClient` and `FixtureProvider` seams
//! - `llm`: OpenAI-compatible completion client
//! - `fixtures`: API-Football fixture provider and fixture summaries
//! - `messages`: Actor messages and request/reply types
//! - `supervisor`: Request orchestration over per-session state

pub mod fixtures;
pub mod llm;
pub mod messages;
pub mod supervisor;
pub mod traits;
