use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::models::{CreateOrderRequest, OrderResponse};
use crate::services::auth_service::Principal;
use crate::services::order_service;
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Serialize, utoipa::ToSchema)]
pub struct OrderCreated {
    pub message: String,
    pub order: OrderResponse,
}

#[utoipa::path(
    post,
    path = "/api/v1/order",
    tag = "Order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order and purchase recorded", body = OrderCreated),
        (status = 400, description = "Payment not completed or course already purchased"),
        (status = 404, description = "Course not found"),
        (status = 502, description = "Payment processor failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    state: web::Data<AppState>,
    user: web::ReqData<Principal>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🧾 POST /order - user {} payment {}", user.id, request.payment_id);

    let order = order_service::record_order(state.store.as_ref(), state.payments.as_ref(), &user.id, &request).await?;

    Ok(HttpResponse::Created().json(OrderCreated {
        message: "Order saved".to_string(),
        order: order.into(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::models::PrincipalKind;
    use crate::test_support::{seed_course, seed_user, TestContext};
    use actix_web::{http::StatusCode, test, web, App};
    use mongodb::bson::oid::ObjectId;
    use serde_json::{json, Value};

    #[actix_rt::test]
    async fn checkout_then_confirm() {
        let ctx = TestContext::new();
        let user = seed_user(ctx.store.as_ref(), "learner@example.com").await;
        let course = seed_course(ctx.store.as_ref(), ObjectId::new(), 59.99).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state()))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/course/buy/{}", course.id.to_hex()))
            .insert_header(ctx.bearer(PrincipalKind::User, &user.id))
            .to_request();
        let checkout: Value = test::call_and_read_body_json(&app, req).await;
        let intent_id = checkout["paymentIntentId"].as_str().unwrap().to_string();

        let order = json!({
            "amount": 59.99,
            "courseId": course.id.to_hex(),
            "paymentId": intent_id,
            "status": "succeeded"
        });

        // client claims success before the processor settled the intent
        let req = test::TestRequest::post()
            .uri("/api/v1/order")
            .insert_header(ctx.bearer(PrincipalKind::User, &user.id))
            .set_json(&order)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["errors"], "Payment not completed");

        ctx.payments.mark_succeeded(&intent_id);
        let req = test::TestRequest::post()
            .uri("/api/v1/order")
            .insert_header(ctx.bearer(PrincipalKind::User, &user.id))
            .set_json(&order)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Order saved");
        assert_eq!(body["order"]["userId"], user.id.to_hex());
        assert_eq!(body["order"]["status"], "succeeded");

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/course/buy/{}", course.id.to_hex()))
            .insert_header(ctx.bearer(PrincipalKind::User, &user.id))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["errors"], "User has already purchased this course");
    }

    #[actix_rt::test]
    async fn malformed_body_is_a_bad_request() {
        let ctx = TestContext::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state()))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/order")
            .insert_header(ctx.bearer(PrincipalKind::User, &ObjectId::new()))
            .set_json(json!({ "courseId": 42 }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert!(body["errors"].is_string());
    }
}
