// Evaluation engine: category scoring, tiering, insights and ranking.
// Rationale text and rubric weighting are the only parts that may reach the provider,
// and only via llm_client.

pub mod evaluator;
pub mod handlers;
pub mod insights;
pub mod models;
pub mod prompts;
pub mod ranking;
pub mod reasoning;
pub mod rubric;
pub mod rubric_source;
pub mod scoring;
pub mod tier;
