// Content generation: prompt building, offline/live completion, response repair.
// Model calls go through llm_client only.

pub mod generator;
pub mod handlers;
pub mod prompts;
