//! Request-scoped data model
//!
//! Nothing here outlives a single HTTP request.

use serde::Serialize;

use super::DomainError;

/// An uploaded image file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Text recovered from an upload.
///
/// A failed recognition still produces text (the failure message), so callers
/// that only look at `text` see the same thing a user would.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub recognized: bool,
}

impl ExtractedText {
    /// Folds a recognition outcome into text.
    pub fn from_recognition(outcome: Result<String, DomainError>) -> Self {
        match outcome {
            Ok(text) => Self {
                text: text.trim().to_string(),
                recognized: true,
            },
            Err(e) => Self {
                text: e.to_string(),
                recognized: false,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Optional caller-supplied instruction and context.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub instruction: Option<String>,
    pub context: Option<String>,
}

impl PromptContext {
    pub fn new(instruction: Option<String>, context: Option<String>) -> Self {
        Self {
            instruction,
            context,
        }
    }

    /// The instruction, if it has any non-whitespace content.
    pub fn instruction(&self) -> Option<&str> {
        non_blank(self.instruction.as_deref())
    }

    /// The context, if it has any non-whitespace content.
    pub fn context(&self) -> Option<&str> {
        non_blank(self.context.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Result of the enhanced analysis pipeline.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnhancedAnalysis {
    pub extracted_text: String,
    pub analysis: Option<String>,
    pub prompt_used: Option<String>,
}

/// Named binary payload attached to an email.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Builds an attachment, sniffing the MIME type from the content.
    pub fn from_upload(upload: ImageUpload) -> Self {
        let content_type = image::guess_format(&upload.bytes)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());

        Self {
            filename: upload.filename,
            content_type,
            bytes: upload.bytes,
        }
    }
}

/// An outgoing email. Can only be built with a body or an attachment.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    recipient: String,
    subject: String,
    body: String,
    attachment: Option<Attachment>,
}

impl EmailMessage {
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        attachment: Option<Attachment>,
    ) -> Result<Self, DomainError> {
        let recipient = recipient.into();
        let body = body.into();
        let attachment = attachment.filter(|a| !a.bytes.is_empty());

        if recipient.trim().is_empty() {
            return Err(DomainError::Validation(
                "E-mail do destinatário é obrigatório.".to_string(),
            ));
        }
        if body.trim().is_empty() && attachment.is_none() {
            return Err(DomainError::Validation(
                "Nenhum conteúdo para enviar (texto ou imagem).".to_string(),
            ));
        }

        Ok(Self {
            recipient: recipient.trim().to_string(),
            subject: subject.into(),
            body,
            attachment,
        })
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        image::RgbImage::new(2, 2)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_extracted_text_is_trimmed() {
        let text = ExtractedText::from_recognition(Ok("  Casa 3 quartos \n\n".to_string()));
        assert_eq!(text.text, "Casa 3 quartos");
        assert!(text.recognized);
    }

    #[test]
    fn test_failed_recognition_becomes_text() {
        let text = ExtractedText::from_recognition(Err(DomainError::Ocr("boom".to_string())));
        assert_eq!(text.text, "Erro ao extrair texto: boom");
        assert!(!text.recognized);
        assert!(!text.is_empty());
    }

    #[test]
    fn test_blank_prompt_fields_are_absent() {
        let ctx = PromptContext::new(Some("   ".to_string()), Some("\n".to_string()));
        assert_eq!(ctx.instruction(), None);
        assert_eq!(ctx.context(), None);

        let ctx = PromptContext::new(Some(" Qual o preço? ".to_string()), None);
        assert_eq!(ctx.instruction(), Some(" Qual o preço? "));
    }

    #[test]
    fn test_email_requires_content() {
        let err = EmailMessage::new("a@b.com", "s", "  ", None).unwrap_err();
        assert!(err.is_client_error());

        let empty = Attachment {
            filename: "x.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![],
        };
        assert!(EmailMessage::new("a@b.com", "s", "", Some(empty)).is_err());
    }

    #[test]
    fn test_email_requires_recipient() {
        assert!(EmailMessage::new(" ", "s", "body", None).is_err());
    }

    #[test]
    fn test_email_with_attachment_only() {
        let attachment = Attachment::from_upload(ImageUpload::new("foto.png", png_bytes()));
        assert_eq!(attachment.content_type, "image/png");

        let msg = EmailMessage::new("a@b.com", "s", "", Some(attachment)).unwrap();
        assert_eq!(msg.attachment().map(|a| a.filename.as_str()), Some("foto.png"));
    }

    #[test]
    fn test_unknown_attachment_type() {
        let attachment = Attachment::from_upload(ImageUpload::new("notes.bin", b"hello".to_vec()));
        assert_eq!(attachment.content_type, "application/octet-stream");
    }
}
