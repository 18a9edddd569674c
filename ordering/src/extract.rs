use axum::{
    Json,
    extract::{
        Form, FromRequest, Multipart, Request,
        multipart::{MultipartError, MultipartRejection},
        rejection::FormRejection,
    },
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::error::SubmitError;
use crate::model::{OrderForm, OrderResult};

/// The form body could not be read at all.
#[derive(Debug, thiserror::Error)]
pub enum OrderFormRejection {
    #[error(transparent)]
    Form(#[from] FormRejection),

    #[error(transparent)]
    Multipart(#[from] MultipartRejection),

    #[error(transparent)]
    MultipartField(#[from] MultipartError),
}

impl IntoResponse for OrderFormRejection {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Unreadable order form body");
        let result = OrderResult::from(SubmitError::unknown(self.to_string()));
        (StatusCode::BAD_REQUEST, Json(result)).into_response()
    }
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

impl<S> FromRequest<S> for OrderForm
where
    S: Send + Sync,
{
    type Rejection = OrderFormRejection;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&request) {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, state).await?;
            return Ok(OrderForm::from_pairs(pairs));
        }

        let mut multipart = Multipart::from_request(request, state).await?;
        let mut pairs = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            // File uploads carry no order data.
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            pairs.push((name, field.text().await?));
        }
        Ok(OrderForm::from_pairs(pairs))
    }
}
