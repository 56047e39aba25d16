//! LLM agent backed by an OpenAI-compatible chat-completions endpoint.
//!
//! The agent runs a bounded tool-calling loop: each step either produces the
//! final answer or asks for tools (web search, image generation) whose
//! observations are fed back on the next step.

mod client;
pub mod models;
mod tools;

pub use client::HfAgent;
