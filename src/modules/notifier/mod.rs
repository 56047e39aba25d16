//! Email delivery over SMTP with STARTTLS and authentication.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::domain::{DomainError, EmailMessage, Notifier};
use crate::infrastructure::config::SmtpConfig;

/// Parse a recipient address. A malformed one is the caller's mistake.
pub fn parse_recipient(address: &str) -> Result<Mailbox, DomainError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| DomainError::Validation(format!("E-mail do destinatário inválido: {e}")))
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
    port: u16,
    /// Upper bound on a whole SMTP session
    timeout: Duration,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, DomainError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| DomainError::Config(format!("invalid sender address: {e}")))?;

        // Plain connection first, upgraded with STARTTLS after EHLO
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| DomainError::Config(format!("create SMTP transport: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();

        Ok(Self {
            transport,
            from,
            host: config.host.clone(),
            port: config.port,
            timeout: config.timeout,
        })
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, DomainError> {
        let to = parse_recipient(message.recipient())?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject());

        let built = match message.attachment() {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .map_err(|e| DomainError::Email(format!("attachment content type: {e}")))?;
                let part = MailAttachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type);

                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(message.body().to_string()))
                        .singlepart(part),
                )
            }
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.body().to_string()),
        };

        built.map_err(|e| DomainError::Email(format!("build email message: {e}")))
    }

    async fn try_send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        let email = self.build_message(message)?;

        // The transport timeout only covers socket reads once the session is up
        tokio::time::timeout(self.timeout, self.transport.send(email))
            .await
            .map_err(|_| self.timed_out())?
            .map_err(|e| DomainError::Email(format!("send SMTP email: {e}")))?;

        Ok(())
    }

    fn timed_out(&self) -> DomainError {
        DomainError::Email(format!(
            "timed out after {}s talking to {}:{}",
            self.timeout.as_secs_f32(),
            self.host,
            self.port
        ))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: EmailMessage) -> bool {
        match self.try_send(&message).await {
            Ok(()) => {
                tracing::info!("E-mail sent to {}", message.recipient());
                true
            }
            Err(e) => {
                tracing::error!(
                    "Failed to send e-mail to {} via {}:{}: {}",
                    message.recipient(),
                    self.host,
                    self.port,
                    e
                );
                false
            }
        }
    }

    async fn check_connection(&self) -> Result<(), DomainError> {
        // Connect, EHLO, STARTTLS and AUTH without sending anything
        let outcome = tokio::time::timeout(self.timeout, self.transport.test_connection())
            .await
            .map_err(|_| self.timed_out())?;

        match outcome {
            Ok(true) => Ok(()),
            Ok(false) => Err(DomainError::Email(
                "server did not accept the connection".to_string(),
            )),
            Err(e) => Err(DomainError::Email(e.to_string())),
        }
    }
}
