//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Page not found")]
    NotFound,

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Page not found".to_string()),
            AppError::Pricing(PricingError::UnknownPolicy { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Pricing(PricingError::InvalidOption(e)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Pricing(PricingError::Policy(e)) => {
                tracing::error!("Policy configuration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Pricing unavailable".to_string())
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error".to_string())
            }
        };

        // Return simple HTML error page
        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head><title>{} - Signage Network</title></head>
<body style="font-family: sans-serif; text-align: center; padding: 50px;">
    <h1>{}</h1>
    <p>{}</p>
    <a href="/pricing">Back to the pricing calculator</a>
</body>
</html>"#,
            status.as_u16(),
            status.as_u16(),
            html_escape(&message)
        );

        (status, axum::response::Html(html)).into_response()
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub type Result<T> = std::result::Result<T, AppError>;
