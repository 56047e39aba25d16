use image::DynamicImage;

use crate::domain::DomainError;

/// Decode uploaded bytes into an image. The format is sniffed from the content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DomainError> {
    if bytes.is_empty() {
        return Err(DomainError::Decode("arquivo vazio".to_string()));
    }

    image::load_from_memory(bytes).map_err(|e| DomainError::Decode(e.to_string()))
}
