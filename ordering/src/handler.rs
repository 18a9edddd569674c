use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::client::OrderIntake;
use crate::error::SubmitError;
use crate::model::{OrderForm, OrderResult};
use crate::validation::validate;

/// Validates order forms and forwards accepted orders to the intake service.
#[derive(Clone)]
pub struct OrderHandler {
    intake: Arc<dyn OrderIntake>,
}

impl OrderHandler {
    pub fn new(intake: Arc<dyn OrderIntake>) -> Self {
        tracing::info!("Initializing new OrderHandler");
        Self { intake }
    }

    /// validate -> submit -> classify; the first failing stage wins.
    pub async fn process(&self, form: &OrderForm) -> Result<Value, SubmitError> {
        let order = validate(form).map_err(SubmitError::Validation)?;
        tracing::debug!(
            local = %order.local,
            fecha = %order.fecha,
            items = order.quantities.total(),
            "Order passed validation"
        );
        self.intake.submit(&order).await
    }

    /// Never fails: every error ends up as an `OrderResult::Failure`.
    pub async fn submit_order(&self, form: &OrderForm) -> OrderResult {
        let started = Instant::now();

        let (outcome, result) = match self.process(form).await {
            Ok(data) => {
                tracing::info!("Order accepted by stock API");
                ("success", OrderResult::success(data))
            }
            Err(SubmitError::Validation(errors)) => {
                tracing::info!(errors = %errors, "Order form rejected");
                ("validation", OrderResult::from(SubmitError::Validation(errors)))
            }
            Err(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Failed to submit order");
                (e.kind(), OrderResult::from(e))
            }
        };

        counter!("orders_submitted_total", "outcome" => outcome).increment(1);
        histogram!("order_submit_seconds").record(started.elapsed().as_secs_f64());

        result
    }
}
