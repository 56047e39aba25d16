//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.

pub mod analysis_service;
pub mod prompt_service;

pub use prompt_service::PromptPlan;
