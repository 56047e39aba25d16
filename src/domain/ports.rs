//! Collaborator trait definitions
//!
//! These traits define the contract for the external systems the handlers talk to.
//! Implementations live in the modules layer.

use async_trait::async_trait;
use image::DynamicImage;

use super::{DomainError, EmailMessage};

/// Turns a decoded image into raw text.
///
/// Implementations may block; callers run them on the blocking pool.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, DomainError>;
}

/// An LLM-backed agent that answers a single instruction.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run the agent to completion and return its final answer.
    async fn run(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Outgoing email delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message. Failures are logged, `false` is the only signal.
    async fn send(&self, message: EmailMessage) -> bool;

    /// Open an authenticated session without sending anything.
    async fn check_connection(&self) -> Result<(), DomainError>;
}
