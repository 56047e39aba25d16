use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::error_response;
use super::form::UploadForm;
use crate::domain::{DomainError, ImageUpload, PromptContext};
use crate::infrastructure::AppState;
use crate::services::analysis_service;

/// Client mistakes are 400, anything else is reported as a processing failure.
fn processing_error(e: DomainError) -> Response {
    if e.is_client_error() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    tracing::error!("Image processing failed: {}", e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Ocorreu um erro ao processar a imagem: {}", e),
    )
}

/// Reads the form and the required image, or answers with the appropriate error.
async fn read_upload(
    multipart: Multipart,
) -> Result<(UploadForm, ImageUpload), Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form
        .take_image()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok((form, upload))
}

fn prompt_context(form: &UploadForm) -> PromptContext {
    PromptContext::new(
        form.text("prompt").map(str::to_string),
        form.text("context").map(str::to_string),
    )
}

/// POST /analyze-image
pub async fn analyze_image(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (_, upload) = match read_upload(multipart).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    match analysis_service::analyze(state.recognizer.clone(), state.agent.as_ref(), upload).await {
        Ok(explanation) => {
            (StatusCode::OK, Json(json!({ "explanation": explanation }))).into_response()
        }
        Err(e) => processing_error(e),
    }
}

/// POST /process-image
pub async fn process_image(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (form, upload) = match read_upload(multipart).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };
    let ctx = prompt_context(&form);

    match analysis_service::process(state.recognizer.clone(), state.agent.as_ref(), upload, &ctx)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(json!({ "result": result }))).into_response(),
        Err(e) => processing_error(e),
    }
}

/// POST /enhanced-image-analysis
pub async fn enhanced_image_analysis(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let (form, upload) = match read_upload(multipart).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };
    let ctx = prompt_context(&form);

    match analysis_service::enhanced(state.recognizer.clone(), state.agent.as_ref(), upload, &ctx)
        .await
    {
        Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => processing_error(e),
    }
}
