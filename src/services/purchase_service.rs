use mongodb::bson::oid::ObjectId;

use crate::database::Store;
use crate::models::{Course, PrincipalKind, Purchase};
use crate::services::course_service::parse_course_id;
use crate::services::payment_service::{to_minor_units, NewPaymentIntent, PaymentGateway, PaymentIntent};
use crate::utils::AppError;

/// What the client needs to confirm the card payment.
#[derive(Debug)]
pub struct Checkout {
    pub course: Course,
    pub intent: PaymentIntent,
    pub email: String,
}

pub(crate) fn already_purchased() -> AppError {
    AppError::AlreadyExists("User has already purchased this course".to_string())
}

/// Starts a checkout: user, course and prior purchase are checked in that
/// order, then a payment intent is opened. Nothing is persisted here; the
/// purchase is recorded once the order is confirmed.
pub async fn buy_course(
    store: &dyn Store,
    payments: &dyn PaymentGateway,
    user_id: &ObjectId,
    course_id: &str,
) -> Result<Checkout, AppError> {
    let user = store
        .find_account(PrincipalKind::User, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let course_id = parse_course_id(course_id)?;
    let course = store
        .find_course(&course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    if store.find_purchase(user_id, &course.id).await?.is_some() {
        return Err(already_purchased());
    }

    let intent = payments
        .create_intent(&NewPaymentIntent {
            amount: to_minor_units(course.price),
            description: format!("Purchase of course: {}", course.title),
            user_id: user_id.to_hex(),
            course_id: course.id.to_hex(),
        })
        .await?;

    log::info!("🛒 Checkout started: user {} course {} intent {}", user_id, course.id, intent.id);
    Ok(Checkout {
        course,
        intent,
        email: user.email,
    })
}

/// Courses the user owns, with the matching purchase records.
pub async fn purchases(store: &dyn Store, user_id: &ObjectId) -> Result<(Vec<Course>, Vec<Purchase>), AppError> {
    let records = store.list_purchases(user_id).await?;
    let course_ids: Vec<ObjectId> = records.iter().map(|p| p.course_id).collect();
    let courses = store.find_courses(&course_ids).await?;
    Ok((courses, records))
}
