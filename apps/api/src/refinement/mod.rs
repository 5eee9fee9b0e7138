// Refinement pipeline: entity extraction, question generation, synthesis.
// All LLM calls go through llm_client — no direct Anthropic SDK calls here.

pub mod extract;
pub mod handlers;
pub mod prompts;
pub mod questions;
pub mod refine;
