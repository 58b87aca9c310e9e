//! Signup, login and logout, shared by the user and admin routes.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde_json::{json, Map, Value};

use crate::models::{AccountView, PrincipalKind};
use crate::services::auth_service::{self, LoginRequest, SignupRequest};
use crate::state::AppState;
use crate::utils::AppError;

const TOKEN_COOKIE: &str = "jwt";

fn body(kind: PrincipalKind, message: String, view: AccountView, token: Option<String>) -> Result<Value, AppError> {
    let mut map = Map::new();
    map.insert("message".to_string(), Value::String(message));
    map.insert(
        kind.key().to_string(),
        serde_json::to_value(view).map_err(|e| AppError::Internal(e.to_string()))?,
    );
    if let Some(token) = token {
        map.insert("token".to_string(), Value::String(token));
    }
    Ok(Value::Object(map))
}

pub async fn signup(
    state: web::Data<AppState>,
    kind: PrincipalKind,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /{}/signup - email: {}", kind.key(), request.email);

    let account = auth_service::signup(state.store.as_ref(), kind, &request).await.map_err(|e| {
        log::warn!("❌ {} signup failed: {}", kind, e);
        e
    })?;

    let message = format!("{} Created Successfully", kind.label());
    Ok(HttpResponse::Created().json(body(kind, message, account.into(), None)?))
}

pub async fn login(
    state: web::Data<AppState>,
    kind: PrincipalKind,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /{}/login - email: {}", kind.key(), request.email);

    let (account, token) = auth_service::login(state.store.as_ref(), &state.auth, kind, &request)
        .await
        .map_err(|e| {
            log::warn!("❌ {} login failed: {} - {}", kind, request.email, e);
            e
        })?;

    let cookie = Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(actix_web::cookie::time::Duration::hours(state.auth.token_ttl_hours))
        .finish();

    log::info!("✅ {} logged in: {}", kind, account.email);
    Ok(HttpResponse::Created()
        .cookie(cookie)
        .json(body(kind, "Login Successful".to_string(), account.into(), Some(token))?))
}

/// Tokens are stateless; logging out only drops the cookie copy.
pub async fn logout(kind: PrincipalKind) -> HttpResponse {
    log::info!("👋 GET /{}/logout", kind.key());

    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "message": format!("{} Logged Out Successfully", kind.label()) }))
}
