use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{format_date, format_time, to_utc};

/// The durable fact that a user bought a course (collection `purchases`).
/// At most one exists per (user, course).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub course_id: ObjectId,
    pub email: String,
    pub purchase_date: BsonDateTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub email: String,
    pub purchase_date: chrono::DateTime<chrono::Utc>,
    pub formatted_purchase_date: String,
    pub formatted_purchase_time: String,
}

impl From<Purchase> for PurchaseResponse {
    fn from(purchase: Purchase) -> Self {
        PurchaseResponse {
            id: purchase.id.to_hex(),
            user_id: purchase.user_id.to_hex(),
            course_id: purchase.course_id.to_hex(),
            email: purchase.email,
            purchase_date: to_utc(purchase.purchase_date),
            formatted_purchase_date: format_date(purchase.purchase_date),
            formatted_purchase_time: format_time(purchase.purchase_date),
        }
    }
}
