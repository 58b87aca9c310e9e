use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::accounts;
use crate::models::{AccountView, CourseResponse, PrincipalKind, PurchaseResponse};
use crate::services::auth_service::{LoginRequest, Principal, SignupRequest};
use crate::services::purchase_service;
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserSignupResponse {
    pub message: String,
    pub user: AccountView,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserLoginResponse {
    pub message: String,
    pub user: AccountView,
    pub token: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PurchasesResponse {
    pub purchased: Vec<CourseResponse>,
    pub purchases: Vec<PurchaseResponse>,
}

#[utoipa::path(
    post,
    path = "/api/v1/user/signup",
    tag = "User",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = UserSignupResponse),
        (status = 400, description = "Validation failed or user already exists")
    )
)]
pub async fn signup(state: web::Data<AppState>, request: web::Json<SignupRequest>) -> Result<HttpResponse, AppError> {
    accounts::signup(state, PrincipalKind::User, request).await
}

#[utoipa::path(
    post,
    path = "/api/v1/user/login",
    tag = "User",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Login successful", body = UserLoginResponse),
        (status = 403, description = "Invalid email or password")
    )
)]
pub async fn login(state: web::Data<AppState>, request: web::Json<LoginRequest>) -> Result<HttpResponse, AppError> {
    accounts::login(state, PrincipalKind::User, request).await
}

#[utoipa::path(
    get,
    path = "/api/v1/user/logout",
    tag = "User",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout() -> HttpResponse {
    accounts::logout(PrincipalKind::User).await
}

#[utoipa::path(
    get,
    path = "/api/v1/user/purchases",
    tag = "User",
    responses(
        (status = 200, description = "Purchased courses", body = PurchasesResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn purchases(state: web::Data<AppState>, user: web::ReqData<Principal>) -> Result<HttpResponse, AppError> {
    log::info!("📦 GET /user/purchases - user {}", user.id);

    let (courses, records) = purchase_service::purchases(state.store.as_ref(), &user.id).await?;

    Ok(HttpResponse::Ok().json(PurchasesResponse {
        purchased: courses.into_iter().map(CourseResponse::from).collect(),
        purchases: records.into_iter().map(PurchaseResponse::from).collect(),
    }))
}
