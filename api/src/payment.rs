use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use crate::{App, config::StripeConfig, error::AppError, error::ApiRequestError};

const CURRENCY: &str = "usd";

// Every intent ships to the same address
const SHIPPING: [(&str, &str); 6] = [
    ("shipping[name]", "TalkRoute Member"),
    ("shipping[address][line1]", "510 Townsend St"),
    ("shipping[address][postal_code]", "98140"),
    ("shipping[address][city]", "San Francisco"),
    ("shipping[address][state]", "CA"),
    ("shipping[address][country]", "US"),
];

#[derive(thiserror::Error, Debug)]
pub enum PaymentError {
    #[error("Price must be a positive amount")]
    InvalidPrice,

    #[error("Payments are not configured on this server")]
    NotConfigured,

    #[error("Payment provider rejected the request: {0}")]
    Provider(String),
}

impl ApiRequestError for PaymentError {
    fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::InvalidPrice => StatusCode::BAD_REQUEST,
            PaymentError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            PaymentError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn route() -> Router<App> {
    Router::<App>::new().route("/create-payment-intent", post(create_payment_intent))
}

/// Converts a price in major units to the provider's minor units, e.g.
/// 10.00 becomes 1000.
pub fn amount_in_minor_units(price: f64) -> Result<i64, PaymentError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PaymentError::InvalidPrice);
    }

    let amount = (price * 100.0).round();
    if amount < 1.0 || amount > i64::MAX as f64 {
        return Err(PaymentError::InvalidPrice);
    }

    Ok(amount as i64)
}

#[derive(Deserialize, Debug)]
pub struct PaymentIntentRequest {
    price: f64,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    client_secret: String,
}

#[derive(Deserialize)]
struct StripePaymentIntent {
    client_secret: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

async fn create_payment_intent(
    State(ctx): State<App>,
    crate::json::Json(req): crate::json::Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let amount = amount_in_minor_units(req.price)?;

    let stripe = ctx
        .config
        .stripe
        .as_ref()
        .ok_or(PaymentError::NotConfigured)?;

    let client_secret = request_payment_intent(&ctx.http, stripe, amount).await?;

    Ok(Json(PaymentIntentResponse { client_secret }))
}

async fn request_payment_intent(
    http: &reqwest::Client,
    stripe: &StripeConfig,
    amount: i64,
) -> Result<String, AppError> {
    let amount = amount.to_string();
    let mut form: Vec<(&str, &str)> = vec![
        ("amount", amount.as_str()),
        ("currency", CURRENCY),
        ("payment_method_types[]", "card"),
    ];
    form.extend(SHIPPING);

    let resp = http
        .post(format!("{}/v1/payment_intents", stripe.api_base))
        .bearer_auth(&stripe.secret_key)
        .form(&form)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let message = resp
            .json::<StripeErrorBody>()
            .await
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or_else(|| format!("status {status}"));

        tracing::error!(%status, %message, "payment intent creation failed");
        return Err(PaymentError::Provider(message).into());
    }

    let intent: StripePaymentIntent = resp.json().await?;
    tracing::info!(amount = %amount, "payment intent created");

    Ok(intent.client_secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::test_utils::{send, test_app};

    #[test]
    fn converts_price_to_minor_units() {
        assert_eq!(amount_in_minor_units(10.00).unwrap(), 1000);
        assert_eq!(amount_in_minor_units(19.99).unwrap(), 1999);
        assert_eq!(amount_in_minor_units(0.1 + 0.2).unwrap(), 30);
    }

    #[test]
    fn rejects_non_positive_prices() {
        for price in [0.0, -5.0, f64::NAN, f64::INFINITY, 0.001] {
            assert!(matches!(
                amount_in_minor_units(price),
                Err(PaymentError::InvalidPrice)
            ));
        }
    }

    #[tokio::test]
    async fn unconfigured_payments_are_unavailable() {
        let (router, _) = test_app();
        let (status, body) = send(
            &router,
            "POST",
            "/create-payment-intent",
            Some(json!({ "price": 10.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["msg"], "Payments are not configured on this server");
    }

    #[tokio::test]
    async fn invalid_price_is_rejected_before_provider_call() {
        let (router, _) = test_app();
        let (status, _) = send(
            &router,
            "POST",
            "/create-payment-intent",
            Some(json!({ "price": -1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
