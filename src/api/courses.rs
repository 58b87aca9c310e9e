use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::models::{CourseResponse, CreateCourseRequest, UpdateCourseRequest};
use crate::services::auth_service::Principal;
use crate::services::{course_service, purchase_service};
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseMessage {
    pub message: String,
    pub course: CourseResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CoursesResponse {
    pub courses: Vec<CourseResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseDetails {
    pub course: CourseResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: String,
    pub course: CourseResponse,
    /// Handed to the card form to confirm the payment client-side.
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
    pub user_email: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/course/create",
    tag = "Course",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseMessage),
        (status = 400, description = "Missing fields or invalid image"),
        (status = 401, description = "Missing or invalid admin token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_course(
    state: web::Data<AppState>,
    admin: web::ReqData<Principal>,
    request: web::Json<CreateCourseRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📚 POST /course/create - admin {}", admin.id);

    let course = course_service::create_course(state.store.as_ref(), state.images.as_ref(), &admin.id, &request).await?;

    Ok(HttpResponse::Created().json(CourseMessage {
        message: "Course Created Successfully".to_string(),
        course: course.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/course/update/{course_id}",
    tag = "Course",
    params(("course_id" = String, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 201, description = "Course updated", body = CourseMessage),
        (status = 404, description = "Course not found or owned by another admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_course(
    state: web::Data<AppState>,
    admin: web::ReqData<Principal>,
    path: web::Path<String>,
    request: web::Json<UpdateCourseRequest>,
) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();
    log::info!("✏️  PUT /course/update/{} - admin {}", course_id, admin.id);

    let course = course_service::update_course(
        state.store.as_ref(),
        state.images.as_ref(),
        &admin.id,
        &course_id,
        &request,
    )
    .await?;

    Ok(HttpResponse::Created().json(CourseMessage {
        message: "Course updated successfully".to_string(),
        course: course.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/course/delete/{course_id}",
    tag = "Course",
    params(("course_id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 404, description = "Course not found or owned by another admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_course(
    state: web::Data<AppState>,
    admin: web::ReqData<Principal>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();
    log::info!("🗑️  DELETE /course/delete/{} - admin {}", course_id, admin.id);

    course_service::delete_course(state.store.as_ref(), state.images.as_ref(), &admin.id, &course_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Course deleted successfully" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/course/courses",
    tag = "Course",
    responses((status = 200, description = "All courses, newest first", body = CoursesResponse))
)]
pub async fn list_courses(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let courses = course_service::list_courses(state.store.as_ref()).await?;
    log::debug!("GET /course/courses - {} courses", courses.len());

    Ok(HttpResponse::Ok().json(CoursesResponse {
        courses: courses.into_iter().map(CourseResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/course/{course_id}",
    tag = "Course",
    params(("course_id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course details", body = CourseDetails),
        (status = 400, description = "Malformed course id"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn course_details(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let course = course_service::course_details(state.store.as_ref(), &path).await?;

    Ok(HttpResponse::Ok().json(CourseDetails { course: course.into() }))
}

#[utoipa::path(
    post,
    path = "/api/v1/course/buy/{course_id}",
    tag = "Course",
    params(("course_id" = String, Path, description = "Course id")),
    responses(
        (status = 201, description = "Payment intent opened", body = CheckoutResponse),
        (status = 400, description = "Course already purchased"),
        (status = 404, description = "User or course not found"),
        (status = 502, description = "Payment processor failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn buy_course(
    state: web::Data<AppState>,
    user: web::ReqData<Principal>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🛒 POST /course/buy/{} - user {}", path.as_str(), user.id);

    let checkout = purchase_service::buy_course(state.store.as_ref(), state.payments.as_ref(), &user.id, &path).await?;

    Ok(HttpResponse::Created().json(CheckoutResponse {
        message: "Course purchased successfully".to_string(),
        course: checkout.course.into(),
        client_secret: checkout.intent.client_secret,
        payment_intent_id: checkout.intent.id,
        user_email: checkout.email,
    }))
}

#[cfg(test)]
mod tests {
    use crate::models::PrincipalKind;
    use crate::test_support::{seed_course, seed_user, TestContext};
    use actix_web::{http::StatusCode, test, web, App};
    use mongodb::bson::oid::ObjectId;
    use serde_json::{json, Value};

    fn course_body() -> Value {
        json!({
            "title": "Ownership in Practice",
            "description": "Borrowing without tears",
            "price": 799,
            "image": { "mimeType": "image/jpeg", "data": "/9j/4AAQSkZJRg==" }
        })
    }

    #[actix_rt::test]
    async fn admin_manages_own_courses() {
        let ctx = TestContext::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state()))
                .configure(crate::api::configure),
        )
        .await;
        let owner = ObjectId::new();

        let req = test::TestRequest::post()
            .uri("/api/v1/course/create")
            .insert_header(ctx.bearer(PrincipalKind::Admin, &owner))
            .set_json(course_body())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        let id = body["course"]["_id"].as_str().unwrap().to_string();
        assert_eq!(body["course"]["image"]["public_id"], "courses/1");

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/course/update/{}", id))
            .insert_header(ctx.bearer(PrincipalKind::Admin, &ObjectId::new()))
            .set_json(json!({ "price": 10 }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/course/update/{}", id))
            .insert_header(ctx.bearer(PrincipalKind::Admin, &owner))
            .set_json(json!({ "title": "Ownership, Revisited" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["course"]["title"], "Ownership, Revisited");
        assert_eq!(body["course"]["price"], 799.0);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/course/delete/{}", id))
            .insert_header(ctx.bearer(PrincipalKind::Admin, &owner))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri(&format!("/api/v1/course/{}", id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn create_needs_an_admin_token_and_every_field() {
        let ctx = TestContext::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state()))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/course/create")
            .insert_header(ctx.bearer(PrincipalKind::User, &ObjectId::new()))
            .set_json(course_body())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/v1/course/create")
            .insert_header(ctx.bearer(PrincipalKind::Admin, &ObjectId::new()))
            .set_json(json!({ "title": "Only a title" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["errors"], "All fields are required");
    }

    #[actix_rt::test]
    async fn catalog_is_public() {
        let ctx = TestContext::new();
        let older = seed_course(ctx.store.as_ref(), ObjectId::new(), 100.0).await;
        let newer = seed_course(ctx.store.as_ref(), ObjectId::new(), 200.0).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state()))
                .configure(crate::api::configure),
        )
        .await;

        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/course/courses").to_request())
                .await;
        let ids: Vec<&str> = body["courses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&older.id.to_hex().as_str()));
        assert!(ids.contains(&newer.id.to_hex().as_str()));

        let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/course/not-an-id").to_request()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn buying_returns_the_client_secret() {
        let ctx = TestContext::new();
        let user = seed_user(ctx.store.as_ref(), "learner@example.com").await;
        let course = seed_course(ctx.store.as_ref(), ObjectId::new(), 349.0).await;
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
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["userEmail"], "learner@example.com");
        assert_eq!(body["paymentIntentId"], "pi_test_1");
        assert_eq!(body["clientSecret"], "pi_test_1_secret");
        assert_eq!(body["course"]["_id"], course.id.to_hex());
    }
}
