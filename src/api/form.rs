//! Multipart form reading shared by the upload handlers

use axum::{
    Json,
    extract::Multipart,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashMap;

use crate::domain::{DomainError, ImageUpload};

/// Name of the file field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Text fields and the `image` file of a multipart request.
#[derive(Debug, Default)]
pub struct UploadForm {
    image: Option<ImageUpload>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Drain the multipart stream. Files other than `image` are ignored.
    pub async fn read(mut multipart: Multipart) -> Result<Self, Response> {
        let mut form = Self::default();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => return Err(multipart_error(e)),
            };

            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            // A part with its own content type is a file even when the name is blank
            let is_file = filename.is_some() || field.content_type().is_some();

            if name == IMAGE_FIELD && is_file {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.image = Some(ImageUpload::new(
                    filename.unwrap_or_default(),
                    bytes.to_vec(),
                ));
            } else if let Some(other) = filename {
                tracing::debug!("Ignoring uploaded file '{}' in field '{}'", other, name);
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// A text field, as sent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The image upload, required to be present and named.
    pub fn take_image(&mut self) -> Result<ImageUpload, DomainError> {
        let upload = self.image.take().ok_or_else(|| {
            DomainError::Validation("Nenhum arquivo de imagem fornecido.".to_string())
        })?;

        if upload.filename.is_empty() {
            return Err(DomainError::Validation(
                "Nome de arquivo inválido.".to_string(),
            ));
        }

        Ok(upload)
    }

    /// The image upload if it carries any bytes. Unnamed files get a default name.
    pub fn take_optional_image(&mut self) -> Option<ImageUpload> {
        let mut upload = self.image.take().filter(|u| !u.bytes.is_empty())?;
        if upload.filename.is_empty() {
            upload.filename = "imagem".to_string();
        }
        Some(upload)
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> Response {
    (e.status(), Json(json!({ "error": e.body_text() }))).into_response()
}
