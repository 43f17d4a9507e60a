// AI content assistant: job descriptions and résumé generation.
// All engine calls go through llm_client::GenerationEngine.

pub mod assistant;
pub mod handlers;
pub mod prompts;
