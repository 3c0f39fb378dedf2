//! # promptsynth - model-aware prompt synthesis
//!
//! Turns a structured description of an image or video generation into the
//! prompt text a specific generative model responds to best.
//!
//! Two pure entry points form the core: [`resolve_strategy`] tunes the
//! upstream call that produces structured fields, and [`compose`] renders
//! those fields for a target model. [`PromptGenerator`] wires both around an
//! OpenAI-compatible chat model.

pub mod compose;
pub mod error;
pub mod models;
pub mod parsing;
pub mod strategy;
pub mod text;
pub mod types;

mod generator;
mod prompts;

// Re-exports
pub use compose::{compose, Composer};
pub use error::{PromptError, Result};
pub use generator::PromptGenerator;
pub use models::TargetModel;
pub use strategy::{resolve_strategy, Strategy, SystemPromptTemplate};
pub use text::enforce_constraints;
pub use types::{
    ComposeConfig, GeneratedPrompt, GeneratorConfig, Parameters, Scene, StructuredPromptInput,
    Usage,
};
