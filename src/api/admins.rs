use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::accounts;
use crate::models::{AccountView, PrincipalKind};
use crate::services::auth_service::{LoginRequest, SignupRequest};
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminSignupResponse {
    pub message: String,
    pub admin: AccountView,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminLoginResponse {
    pub message: String,
    pub admin: AccountView,
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/signup",
    tag = "Admin",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Admin created", body = AdminSignupResponse),
        (status = 400, description = "Validation failed or admin already exists")
    )
)]
pub async fn signup(state: web::Data<AppState>, request: web::Json<SignupRequest>) -> Result<HttpResponse, AppError> {
    accounts::signup(state, PrincipalKind::Admin, request).await
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    tag = "Admin",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Login successful", body = AdminLoginResponse),
        (status = 403, description = "Invalid email or password")
    )
)]
pub async fn login(state: web::Data<AppState>, request: web::Json<LoginRequest>) -> Result<HttpResponse, AppError> {
    accounts::login(state, PrincipalKind::Admin, request).await
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/logout",
    tag = "Admin",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout() -> HttpResponse {
    accounts::logout(PrincipalKind::Admin).await
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestContext;
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};

    #[actix_rt::test]
    async fn admin_accounts_are_separate_from_users() {
        let ctx = TestContext::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state()))
                .configure(crate::api::configure),
        )
        .await;
        let account = json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "engine01"
        });

        for uri in ["/api/v1/admin/signup", "/api/v1/user/signup"] {
            let req = test::TestRequest::post().uri(uri).set_json(&account).to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/admin/signup")
            .set_json(&account)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["errors"], "Admin already exists");

        let req = test::TestRequest::post()
            .uri("/api/v1/admin/login")
            .set_json(json!({ "email": "ada@example.com", "password": "engine01" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["admin"]["firstName"], "Ada");
        assert!(body["token"].is_string());
    }

    #[actix_rt::test]
    async fn logout_expires_the_cookie() {
        let ctx = TestContext::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state()))
                .configure(crate::api::configure),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/admin/logout").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res.response().cookies().find(|c| c.name() == "jwt").unwrap();
        assert_eq!(cookie.value(), "");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Admin Logged Out Successfully");
    }
}
