use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::error_response;
use super::form::UploadForm;
use crate::domain::{Attachment, EmailMessage};
use crate::infrastructure::AppState;
use crate::modules::notifier::parse_recipient;

/// POST /send-email
pub async fn send_email(State(state): State<AppState>, multipart: Multipart) -> Response {
    let mut form = match UploadForm::read(multipart).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };

    let recipient = form.text("email").unwrap_or_default().to_string();
    let text = form.text("text").unwrap_or_default().to_string();
    let attachment = form.take_optional_image().map(Attachment::from_upload);

    // Missing or malformed recipient and empty messages never reach SMTP
    let message = match EmailMessage::new(recipient, &state.config.smtp.subject, text, attachment)
    {
        Ok(message) => message,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    if let Err(e) = parse_recipient(message.recipient()) {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    if state.notifier.send(message).await {
        (
            StatusCode::OK,
            Json(json!({ "message": "E-mail enviado com sucesso!" })),
        )
            .into_response()
    } else {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Falha ao enviar o e-mail. Verifique as configurações SMTP.",
        )
    }
}

/// GET /test-smtp-connection
pub async fn test_smtp_connection(State(state): State<AppState>) -> Response {
    let smtp = &state.config.smtp;

    match state.notifier.check_connection().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Conexão SMTP bem-sucedida!",
                "server": smtp.host,
                "port": smtp.port,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("SMTP connection check failed: {}", e);
            // Only whether the password is set, never its value
            let password = if smtp.password.is_empty() {
                "não definida"
            } else {
                "definida"
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "error": format!("Falha na conexão SMTP: {}", e),
                    "loaded_vars": {
                        "SMTP_SERVER": smtp.host,
                        "SMTP_PORT": smtp.port,
                        "EMAIL_USER": smtp.username,
                        "EMAIL_PASSWORD": password,
                    },
                })),
            )
                .into_response()
        }
    }
}
