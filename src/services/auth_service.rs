use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::config::AuthSettings;
use crate::database::Store;
use crate::models::{Account, PrincipalKind};
use crate::utils::AppError;

const BCRYPT_COST: u32 = 10;
const SIGNUP_FIELDS: [&str; 4] = ["first_name", "last_name", "email", "password"];

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // account id (hex)
    pub kind: PrincipalKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Authenticated actor attached to a request by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: ObjectId,
    pub kind: PrincipalKind,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 3, message = "FirstName must be at least 3 characters long"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 3, message = "LastName must be at least 3 characters long"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

impl SignupRequest {
    /// Copy with surrounding whitespace removed from the names and email,
    /// so validation sees what is stored.
    fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn secret_for(settings: &AuthSettings, kind: PrincipalKind) -> &str {
    match kind {
        PrincipalKind::User => &settings.user_secret,
        PrincipalKind::Admin => &settings.admin_secret,
    }
}

/// Flattens validator output into client messages, in form order.
fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let field_errors = errors.field_errors();
    SIGNUP_FIELDS
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", e.code))
        })
        .collect()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers a new account of `kind`.
pub async fn signup(
    store: &dyn Store,
    kind: PrincipalKind,
    request: &SignupRequest,
) -> Result<Account, AppError> {
    let request = request.trimmed();
    if let Err(errors) = request.validate() {
        return Err(AppError::Validation(validation_messages(&errors)));
    }

    let email = normalize_email(&request.email);
    if store.find_account_by_email(kind, &email).await?.is_some() {
        return Err(AppError::AlreadyExists(format!("{} already exists", kind.label())));
    }

    let password = hash(&request.password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let now = BsonDateTime::now();
    let account = Account {
        id: ObjectId::new(),
        first_name: request.first_name,
        last_name: request.last_name,
        email,
        password,
        created_at: now,
        updated_at: now,
    };

    // The unique index still rejects a concurrent signup with the same email.
    store.insert_account(kind, &account).await?;

    log::info!("✅ {} registered: {}", kind, account.email);
    Ok(account)
}

/// Checks credentials and issues a bearer token signed with the kind's secret.
pub async fn login(
    store: &dyn Store,
    settings: &AuthSettings,
    kind: PrincipalKind,
    request: &LoginRequest,
) -> Result<(Account, String), AppError> {
    let invalid = || AppError::Forbidden("Invalid email or password".to_string());

    let account = store
        .find_account_by_email(kind, &normalize_email(&request.email))
        .await?
        .ok_or_else(invalid)?;

    let valid = verify(&request.password, &account.password)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;
    if !valid {
        return Err(invalid());
    }

    let token = issue_token(settings, kind, &account.id)?;
    Ok((account, token))
}

pub fn issue_token(settings: &AuthSettings, kind: PrincipalKind, id: &ObjectId) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: id.to_hex(),
        kind,
        iat: now.timestamp(),
        exp: (now + Duration::hours(settings.token_ttl_hours)).timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret_for(settings, kind).as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Validates signature, expiry and principal kind.
pub fn verify_token(settings: &AuthSettings, kind: PrincipalKind, token: &str) -> Result<Principal, AppError> {
    let invalid = |reason: String| {
        log::debug!("🔒 Rejected {} token: {}", kind, reason);
        AppError::Unauthorized("Invalid token or token expired".to_string())
    };

    let validation = Validation::new(Algorithm::HS256);
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret_for(settings, kind).as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| invalid(e.to_string()))?;

    if claims.kind != kind {
        return Err(invalid(format!("token issued for {}", claims.kind)));
    }

    let id = ObjectId::parse_str(&claims.sub).map_err(|e| invalid(e.to_string()))?;
    Ok(Principal { id, kind })
}
