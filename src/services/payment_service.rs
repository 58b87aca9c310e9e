use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::StripeSettings;
use crate::utils::AppError;

pub const STATUS_SUCCEEDED: &str = "succeeded";

/// Payment intent as reported by the processor.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Minor currency units (paise, cents).
    pub amount: i64,
    pub currency: String,
    pub status: String,
    /// Checkout references attached on creation (`user_id`, `course_id`).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    /// True when the processor settled this intent for the given checkout.
    /// The amount is whatever was charged at checkout, so a later reprice of
    /// the course does not invalidate it.
    pub fn settles(&self, user_id: &str, course_id: &str) -> bool {
        self.status == STATUS_SUCCEEDED
            && self.metadata.get("user_id").map(String::as_str) == Some(user_id)
            && self.metadata.get("course_id").map(String::as_str) == Some(course_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub amount: i64,
    pub description: String,
    pub user_id: String,
    pub course_id: String,
}

/// Payment processor seam.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, intent: &NewPaymentIntent) -> Result<PaymentIntent, AppError>;
    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, AppError>;
}

/// Converts a price in major units to the processor's minor units.
pub fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

pub fn from_minor_units(amount: i64) -> f64 {
    amount as f64 / 100.0
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Stripe REST client (form-encoded requests, bearer secret key).
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
    currency: String,
}

impl StripeClient {
    pub fn new(settings: &StripeSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            secret_key: settings.secret_key.clone(),
            currency: settings.currency.clone(),
        }
    }

    async fn parse(response: reqwest::Response) -> Result<PaymentIntent, AppError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| format!("payment processor returned {}", status));
            return Err(AppError::Payment(message));
        }

        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| AppError::Payment(format!("Failed to parse payment intent: {}", e)))
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_intent(&self, intent: &NewPaymentIntent) -> Result<PaymentIntent, AppError> {
        log::info!("💳 Creating payment intent: {} {}", intent.amount, self.currency);

        let form = [
            ("amount", intent.amount.to_string()),
            ("currency", self.currency.clone()),
            ("description", intent.description.clone()),
            ("payment_method_types[]", "card".to_string()),
            ("metadata[user_id]", intent.user_id.clone()),
            ("metadata[course_id]", intent.course_id.clone()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("Failed to reach payment processor: {}", e)))?;

        Self::parse(response).await
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, AppError> {
        let response = self
            .http
            .get(format!(
                "{}/v1/payment_intents/{}",
                self.api_base,
                urlencoding::encode(id)
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("Failed to reach payment processor: {}", e)))?;

        Self::parse(response).await
    }
}
