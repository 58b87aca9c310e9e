use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

use crate::database::Store;
use crate::models::{CreateOrderRequest, Order, PrincipalKind, Purchase};
use crate::services::course_service::parse_course_id;
use crate::services::payment_service::{from_minor_units, PaymentGateway};
use crate::services::purchase_service::already_purchased;
use crate::utils::AppError;

/// Confirms a checkout: the processor must report the intent as settled for
/// this user and course before the order and purchase are written. The order
/// records the amount actually charged, which may differ from the current
/// price if the course was repriced after checkout.
pub async fn record_order(
    store: &dyn Store,
    payments: &dyn PaymentGateway,
    user_id: &ObjectId,
    request: &CreateOrderRequest,
) -> Result<Order, AppError> {
    let course_id = parse_course_id(&request.course_id)?;
    let payment_id = request.payment_id.trim();
    if payment_id.is_empty() {
        return Err(AppError::InvalidRequest("paymentId is required".to_string()));
    }

    if request.user_id.as_deref().is_some_and(|id| id != user_id.to_hex()) {
        log::warn!("⚠️  Ignoring userId in order body; token belongs to {}", user_id);
    }

    let user = store
        .find_account(PrincipalKind::User, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let course = store
        .find_course(&course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    if store.find_purchase(user_id, &course.id).await?.is_some() {
        return Err(already_purchased());
    }

    let intent = payments.retrieve_intent(payment_id).await?;
    if !intent.settles(&user_id.to_hex(), &course.id.to_hex()) {
        log::warn!(
            "⚠️  Order refused: intent {} is {} (client said {:?}) for course {}",
            intent.id,
            intent.status,
            request.status,
            course.id
        );
        return Err(AppError::InvalidRequest("Payment not completed".to_string()));
    }

    let amount = from_minor_units(intent.amount);
    if (request.amount - amount).abs() > f64::EPSILON {
        log::debug!("Client reported amount {} for intent charging {}", request.amount, amount);
    }
    if (course.price - amount).abs() > f64::EPSILON {
        log::info!("Course {} was repriced to {} after checkout at {}", course.id, course.price, amount);
    }

    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| user.email.clone());

    let now = BsonDateTime::now();
    // Purchase first: its uniqueness rule decides a concurrent double confirm.
    let purchase = Purchase {
        id: ObjectId::new(),
        user_id: *user_id,
        course_id: course.id,
        email: email.clone(),
        purchase_date: now,
    };
    store.insert_purchase(&purchase).await?;

    let order = Order {
        id: ObjectId::new(),
        amount,
        email,
        user_id: *user_id,
        course_id: course.id,
        payment_id: intent.id,
        status: intent.status,
        created_at: now,
        updated_at: now,
    };
    if let Err(e) = store.insert_order(&order).await {
        // A purchase without its order would block every retry.
        if let Err(rollback) = store.delete_purchase(&purchase.id).await {
            log::error!("❌ Could not remove purchase {} after failed order: {}", purchase.id, rollback);
        }
        return Err(e);
    }

    log::info!("🧾 Order recorded: {} for course {} by user {}", order.id, course.id, user_id);
    Ok(order)
}
