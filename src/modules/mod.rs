//! Integrations with the external collaborators: OCR engine, LLM agent, SMTP.

pub mod agent;
#[cfg(feature = "email")]
pub mod notifier;
pub mod scanner;
