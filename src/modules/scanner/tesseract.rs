use image::{DynamicImage, ImageFormat};
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::domain::{DomainError, TextRecognizer};
use crate::infrastructure::config::OcrConfig;

/// Runs the tesseract CLI on a temporary PNG copy of the image.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: String,
    language: Option<String>,
}

impl TesseractRecognizer {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_bin.clone(),
            language: config.language.clone(),
        }
    }

    fn run(&self, image_path: &Path) -> Result<String, DomainError> {
        // tesseract <image_path> stdout [-l <lang>]
        let mut command = Command::new(&self.binary);
        command.arg(image_path).arg("stdout");
        if let Some(lang) = &self.language {
            command.arg("-l").arg(lang);
        }

        let output = command
            .output()
            .map_err(|e| DomainError::Ocr(format!("Failed to execute tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::Ocr(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| DomainError::Ocr(format!("Invalid UTF-8 output: {}", e)))?;

        Ok(text.trim().to_string())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, DomainError> {
        let temp_path = std::env::temp_dir().join(format!("ocr_{}.png", uuid::Uuid::new_v4()));

        image
            .save_with_format(&temp_path, ImageFormat::Png)
            .map_err(|e| DomainError::Ocr(format!("Failed to save image: {}", e)))?;

        let result = self.run(&temp_path);

        // Cleanup
        if let Err(e) = fs::remove_file(&temp_path) {
            tracing::warn!("Failed to remove {}: {}", temp_path.display(), e);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_an_ocr_error() {
        let recognizer = TesseractRecognizer::new(&OcrConfig {
            tesseract_bin: "/nonexistent/tesseract-binary".to_string(),
            language: None,
        });
        let image = DynamicImage::new_rgb8(2, 2);

        let err = recognizer.recognize(&image).unwrap_err();
        assert!(matches!(err, DomainError::Ocr(_)));
        assert!(err.to_string().starts_with("Erro ao extrair texto: "));
    }
}
