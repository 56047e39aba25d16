//! Application state containing configuration and the injected collaborators

use std::sync::Arc;

use crate::domain::{Agent, DomainError, TextRecognizer};
#[cfg(feature = "email")]
use crate::domain::Notifier;
use crate::infrastructure::config::Config;
use crate::modules::agent::HfAgent;
#[cfg(feature = "email")]
use crate::modules::notifier::SmtpNotifier;
use crate::modules::scanner::TesseractRecognizer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Read-only configuration loaded at startup
    pub config: Arc<Config>,
    /// OCR engine
    pub recognizer: Arc<dyn TextRecognizer>,
    /// LLM agent, built once and reused by every request
    pub agent: Arc<dyn Agent>,
    /// Outgoing email
    #[cfg(feature = "email")]
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create the state with the production collaborators
    pub fn from_config(config: Config) -> Result<Self, DomainError> {
        let recognizer = Arc::new(TesseractRecognizer::new(&config.ocr));
        let agent = Arc::new(HfAgent::new(&config.agent)?);
        #[cfg(feature = "email")]
        let notifier = Arc::new(SmtpNotifier::new(&config.smtp)?);

        Ok(Self {
            config: Arc::new(config),
            recognizer,
            agent,
            #[cfg(feature = "email")]
            notifier,
        })
    }
}
