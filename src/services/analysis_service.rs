//! Image analysis service - OCR followed by an optional agent call
//!
//! Pure pipeline logic without the HTTP layer. Each function handles one request
//! and keeps nothing once it returns.

use std::sync::Arc;

use crate::domain::{
    Agent, DomainError, EnhancedAnalysis, ExtractedText, ImageUpload, PromptContext,
    TextRecognizer,
};
use crate::modules::scanner::decode_image;
use crate::services::prompt_service::{self, PromptPlan};

/// Decode the upload and run OCR on the blocking pool.
///
/// Undecodable bytes are an error; recognition failures come back as text.
pub async fn extract_text(
    recognizer: Arc<dyn TextRecognizer>,
    upload: ImageUpload,
) -> Result<ExtractedText, DomainError> {
    let filename = upload.filename.clone();

    let extracted = tokio::task::spawn_blocking(move || {
        let image = decode_image(&upload.bytes)?;
        Ok::<_, DomainError>(ExtractedText::from_recognition(recognizer.recognize(&image)))
    })
    .await
    .map_err(|e| DomainError::Internal(format!("OCR task failed: {}", e)))??;

    if extracted.recognized {
        tracing::info!("Extracted {} chars from '{}'", extracted.text.len(), filename);
    } else {
        tracing::warn!("OCR failed for '{}': {}", filename, extracted.text);
    }

    Ok(extracted)
}

/// Real-estate assessment of the text in an image.
pub async fn analyze(
    recognizer: Arc<dyn TextRecognizer>,
    agent: &dyn Agent,
    upload: ImageUpload,
) -> Result<String, DomainError> {
    let extracted = extract_text(recognizer, upload).await?;

    if extracted.is_empty() {
        return Err(DomainError::Validation(
            "Nenhum texto foi extraído da imagem.".to_string(),
        ));
    }

    agent
        .run(&prompt_service::assessment_prompt(&extracted.text))
        .await
}

/// Extracted text, or the agent's answer when an instruction is given.
pub async fn process(
    recognizer: Arc<dyn TextRecognizer>,
    agent: &dyn Agent,
    upload: ImageUpload,
    ctx: &PromptContext,
) -> Result<String, DomainError> {
    let extracted = extract_text(recognizer, upload).await?;

    if extracted.is_empty() {
        return Ok(String::new());
    }

    match prompt_service::plan(&extracted.text, ctx) {
        PromptPlan::ExtractedTextOnly => Ok(extracted.text),
        PromptPlan::Ask(prompt) => agent.run(&prompt).await,
    }
}

/// Like [`process`], but reports the extracted text and the prompt alongside the answer.
pub async fn enhanced(
    recognizer: Arc<dyn TextRecognizer>,
    agent: &dyn Agent,
    upload: ImageUpload,
    ctx: &PromptContext,
) -> Result<EnhancedAnalysis, DomainError> {
    let extracted = extract_text(recognizer, upload).await?;

    let plan = if extracted.is_empty() {
        PromptPlan::ExtractedTextOnly
    } else {
        prompt_service::plan(&extracted.text, ctx)
    };

    let (analysis, prompt_used) = match plan {
        PromptPlan::ExtractedTextOnly => (None, None),
        PromptPlan::Ask(prompt) => (Some(agent.run(&prompt).await?), Some(prompt)),
    };

    Ok(EnhancedAnalysis {
        extracted_text: extracted.text,
        analysis,
        prompt_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::DynamicImage;
    use std::sync::Mutex;

    struct FixedRecognizer(Result<String, DomainError>);

    impl TextRecognizer for FixedRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, DomainError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingAgent {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Agent for RecordingAgent {
        async fn run(&self, prompt: &str) -> Result<String, DomainError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("resposta".to_string())
        }
    }

    fn recognizer(text: &str) -> Arc<dyn TextRecognizer> {
        Arc::new(FixedRecognizer(Ok(text.to_string())))
    }

    fn png_upload() -> ImageUpload {
        let mut out = std::io::Cursor::new(Vec::new());
        image::RgbImage::new(3, 3)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        ImageUpload::new("anuncio.png", out.into_inner())
    }

    #[tokio::test]
    async fn test_extract_rejects_non_image() {
        let upload = ImageUpload::new("notes.txt", b"hello".to_vec());
        let err = extract_text(recognizer("x"), upload).await.unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));
    }

    #[tokio::test]
    async fn test_extract_reports_ocr_failure_as_text() {
        let failing: Arc<dyn TextRecognizer> =
            Arc::new(FixedRecognizer(Err(DomainError::Ocr("no tesseract".to_string()))));
        let extracted = extract_text(failing, png_upload()).await.unwrap();
        assert_eq!(extracted.text, "Erro ao extrair texto: no tesseract");
        assert!(!extracted.recognized);
    }

    #[tokio::test]
    async fn test_analyze_empty_text_skips_agent() {
        let agent = RecordingAgent::default();
        let err = analyze(recognizer("   "), &agent, png_upload())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation("Nenhum texto foi extraído da imagem.".to_string())
        );
        assert!(agent.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_without_prompt_returns_text() {
        let agent = RecordingAgent::default();
        let result = process(
            recognizer(" Casa à venda \n"),
            &agent,
            png_upload(),
            &PromptContext::default(),
        )
        .await
        .unwrap();
        assert_eq!(result, "Casa à venda");
        assert!(agent.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enhanced_reports_prompt() {
        let agent = RecordingAgent::default();
        let ctx = PromptContext::new(Some("Resuma".to_string()), Some("família".to_string()));
        let result = enhanced(recognizer("Casa à venda"), &agent, png_upload(), &ctx)
            .await
            .unwrap();

        assert_eq!(result.extracted_text, "Casa à venda");
        assert_eq!(result.analysis.as_deref(), Some("resposta"));
        let prompts = agent.prompts.lock().unwrap();
        assert_eq!(result.prompt_used.as_deref(), Some(prompts[0].as_str()));
    }

    #[tokio::test]
    async fn test_enhanced_empty_text_with_prompt() {
        let agent = RecordingAgent::default();
        let ctx = PromptContext::new(Some("Resuma".to_string()), None);
        let result = enhanced(recognizer(""), &agent, png_upload(), &ctx)
            .await
            .unwrap();

        assert_eq!(result.extracted_text, "");
        assert!(result.analysis.is_none());
        assert!(result.prompt_used.is_none());
        assert!(agent.prompts.lock().unwrap().is_empty());
    }
}
