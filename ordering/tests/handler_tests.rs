mod test_utils;

use async_trait::async_trait;
use mockall::mock;
use ordering::client::OrderIntake;
use ordering::error::{SubmitError, UNKNOWN_ERROR_MESSAGE};
use ordering::handler::OrderHandler;
use ordering::model::{Location, OrderRequest, OrderResult, SUCCESS_MESSAGE};
use ordering::validation::NO_PRODUCTS;
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::{form_with, form_with_all_quantities, valid_form, valid_order};

mock! {
    pub OrderIntake {}

    #[async_trait]
    impl OrderIntake for OrderIntake {
        async fn submit(&self, order: &OrderRequest) -> Result<Value, SubmitError>;
    }
}

fn handler_with(intake: MockOrderIntake) -> OrderHandler {
    OrderHandler::new(Arc::new(intake))
}

#[tokio::test]
async fn test_accepted_order_returns_remote_body() {
    let mut intake = MockOrderIntake::new();
    intake
        .expect_submit()
        .withf(|order| {
            let expected = valid_order();
            order.local == expected.local
                && order.fecha == expected.fecha
                && order.quantities == expected.quantities
        })
        .times(1)
        .returning(|_| Ok(json!({"id": 42})));

    let result = handler_with(intake).submit_order(&valid_form()).await;

    assert_eq!(result, OrderResult::success(json!({"id": 42})));
    assert_eq!(result.message(), SUCCESS_MESSAGE);
}

#[tokio::test]
async fn test_invalid_form_never_reaches_intake() {
    let mut intake = MockOrderIntake::new();
    intake.expect_submit().never();

    let result = handler_with(intake)
        .submit_order(&form_with_all_quantities("0"))
        .await;

    assert!(!result.is_success());
    let errors = result.validation_errors().expect("validation errors attached");
    assert_eq!(errors.get("general").map(String::as_str), Some(NO_PRODUCTS));
}

#[tokio::test]
async fn test_upstream_status_is_reported_in_message() {
    let mut intake = MockOrderIntake::new();
    intake.expect_submit().returning(|_| {
        Err(SubmitError::UpstreamStatus {
            status: 503,
            reason: "Service Unavailable".to_string(),
        })
    });

    let result = handler_with(intake).submit_order(&valid_form()).await;

    assert_eq!(
        result,
        OrderResult::failure("Error al procesar el pedido: 503 Service Unavailable")
    );
    assert!(result.validation_errors().is_none());
}

#[tokio::test]
async fn test_upstream_format_error_message() {
    let mut intake = MockOrderIntake::new();
    intake
        .expect_submit()
        .returning(|_| Err(SubmitError::UpstreamFormat));

    let result = handler_with(intake).submit_order(&valid_form()).await;

    assert_eq!(result.message(), "El servidor no respondió con JSON válido");
}

#[tokio::test]
async fn test_unknown_error_falls_back_to_generic_message() {
    let mut intake = MockOrderIntake::new();
    intake
        .expect_submit()
        .returning(|_| Err(SubmitError::unknown("")));

    let result = handler_with(intake).submit_order(&valid_form()).await;

    assert_eq!(result, OrderResult::failure(UNKNOWN_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_huge_quantities_with_debug_logging_do_not_panic() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut intake = MockOrderIntake::new();
    intake
        .expect_submit()
        .withf(|order| order.quantities.pollo == 18_000_000_000_000_000_000)
        .times(1)
        .returning(|_| Ok(json!({"id": 7})));

    let form = form_with_all_quantities("0")
        .with("pollo", "18000000000000000000")
        .with("mila", "9000000000000000000");
    let result = handler_with(intake).submit_order(&form).await;

    assert_eq!(result, OrderResult::success(json!({"id": 7})));
}

#[tokio::test]
async fn test_process_exposes_the_failing_stage() {
    let mut intake = MockOrderIntake::new();
    intake
        .expect_submit()
        .withf(|order| order.local == Location::Opcion2)
        .returning(|_| Err(SubmitError::UpstreamFormat));
    let handler = handler_with(intake);

    let validation = handler.process(&form_with("fecha", "hoy")).await;
    assert!(matches!(validation, Err(SubmitError::Validation(_))));

    let upstream = handler.process(&form_with("local", "opcion2")).await;
    assert!(matches!(upstream, Err(SubmitError::UpstreamFormat)));
}
