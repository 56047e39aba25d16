//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Request validation error, message is shown to the caller as-is
    Validation(String),
    /// Uploaded bytes are not a supported image
    Decode(String),
    /// OCR engine failure
    Ocr(String),
    /// Agent endpoint or agent loop failure
    Agent(String),
    /// External service error (agent tools)
    External(String),
    /// SMTP session or message building failure
    Email(String),
    /// Missing or malformed configuration
    Config(String),
    /// Generic internal error
    Internal(String),
}

impl DomainError {
    /// Whether the error was caused by the request itself rather than by a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DomainError::Validation(_) | DomainError::Decode(_))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "{}", msg),
            DomainError::Decode(msg) => write!(f, "Arquivo de imagem inválido: {}", msg),
            DomainError::Ocr(msg) => write!(f, "Erro ao extrair texto: {}", msg),
            DomainError::Agent(msg) => write!(f, "Agent error: {}", msg),
            DomainError::External(msg) => write!(f, "External service error: {}", msg),
            DomainError::Email(msg) => write!(f, "Email error: {}", msg),
            DomainError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
