use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{format_date, format_time, to_utc};

/// Payment-side record of a completed checkout (collection `orders`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Major currency units, as the course is priced.
    pub amount: f64,
    pub email: String,
    pub user_id: ObjectId,
    pub course_id: ObjectId,
    /// Payment intent id at the processor.
    pub payment_id: String,
    /// Status reported by the processor when the order was recorded.
    pub status: String,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

/// Body the client posts after the processor confirmed the card payment.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub amount: f64,
    #[serde(default)]
    pub email: Option<String>,
    /// Ignored; the user always comes from the bearer token.
    #[serde(default)]
    pub user_id: Option<String>,
    pub course_id: String,
    pub payment_id: String,
    /// Client-observed status; the processor's answer wins.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub amount: f64,
    pub email: String,
    pub user_id: String,
    pub course_id: String,
    pub payment_id: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub formatted_created_at: String,
    pub formatted_updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id.to_hex(),
            amount: order.amount,
            email: order.email,
            user_id: order.user_id.to_hex(),
            course_id: order.course_id.to_hex(),
            payment_id: order.payment_id,
            status: order.status,
            created_at: to_utc(order.created_at),
            formatted_created_at: format_date(order.created_at),
            formatted_updated_at: format_time(order.updated_at),
        }
    }
}
