use crate::model::OrderResult;
use crate::validation::ValidationErrors;

pub const INVALID_FORM_MESSAGE: &str = "Datos del pedido inválidos";
pub const NON_JSON_RESPONSE_MESSAGE: &str = "El servidor no respondió con JSON válido";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Error desconocido al procesar el pedido";

/// Every way an order submission can fail, one variant per pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{}", INVALID_FORM_MESSAGE)]
    Validation(ValidationErrors),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Error al procesar el pedido: {status} {reason}")]
    UpstreamStatus { status: u16, reason: String },

    #[error("{}", NON_JSON_RESPONSE_MESSAGE)]
    UpstreamFormat,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{}", .0.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
    Unknown(Option<String>),
}

impl SubmitError {
    /// Blank messages fall back to the generic one.
    pub fn unknown(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            SubmitError::Unknown(None)
        } else {
            SubmitError::Unknown(Some(message))
        }
    }

    /// Stable label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Validation(_) => "validation",
            SubmitError::Transport(_) => "transport",
            SubmitError::UpstreamStatus { .. } => "upstream_status",
            SubmitError::UpstreamFormat => "upstream_format",
            SubmitError::Json(_) => "json",
            SubmitError::Unknown(_) => "unknown",
        }
    }
}

impl From<SubmitError> for OrderResult {
    fn from(error: SubmitError) -> Self {
        let message = error.to_string();
        match error {
            SubmitError::Validation(errors) => OrderResult::Failure {
                message,
                errors: Some(errors.into_map()),
            },
            _ => OrderResult::failure(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_message_embeds_code_and_reason() {
        let error = SubmitError::UpstreamStatus {
            status: 500,
            reason: "Internal Server Error".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Error al procesar el pedido: 500 Internal Server Error"
        );
    }

    #[test]
    fn unknown_without_message_uses_fallback() {
        assert_eq!(SubmitError::unknown("  ").to_string(), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(SubmitError::unknown("disk on fire").to_string(), "disk on fire");
    }

    #[test]
    fn validation_failure_keeps_field_messages() {
        let mut errors = ValidationErrors::default();
        errors.insert("fecha", "Formato de fecha inválido (debe ser dd/mm/yyyy)");
        let result = OrderResult::from(SubmitError::Validation(errors));

        assert_eq!(result.message(), INVALID_FORM_MESSAGE);
        let fields = result.validation_errors().unwrap();
        assert!(fields.contains_key("fecha"));
    }

    #[test]
    fn non_json_message_is_fixed() {
        assert_eq!(SubmitError::UpstreamFormat.to_string(), NON_JSON_RESPONSE_MESSAGE);
    }
}
