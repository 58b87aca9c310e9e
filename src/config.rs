use std::env;
use thiserror::Error;

const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:5173,https://e-commerce-course-app.vercel.app";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is not valid: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Signing material for the two principal kinds.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub user_secret: String,
    pub admin_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub secret_key: String,
    pub api_base: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub auth: AuthSettings,
    pub stripe: StripeSettings,
    pub cloudinary: Option<CloudinarySettings>,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => 4001,
        };

        let token_ttl_hours = match get("JWT_TTL_HOURS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "JWT_TTL_HOURS",
                        value: raw,
                    })
                }
            },
            None => 24,
        };

        let secret_key = get("STRIPE_SECRET_KEY").ok_or(ConfigError::Missing("STRIPE_SECRET_KEY"))?;

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinarySettings {
                cloud_name,
                api_key,
                api_secret,
                folder: get("CLOUDINARY_FOLDER"),
                api_base: get("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|| "https://api.cloudinary.com".to_string()),
            }),
            _ => None,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: get("DATABASE_URL"),
            auth: AuthSettings {
                user_secret: get("JWT_USER_SECRET").unwrap_or_else(|| "default_secret".to_string()),
                admin_secret: get("JWT_ADMIN_SECRET")
                    .unwrap_or_else(|| "admin_default_secret".to_string()),
                token_ttl_hours,
            },
            stripe: StripeSettings {
                secret_key,
                api_base: get("STRIPE_API_BASE").unwrap_or_else(|| "https://api.stripe.com".to_string()),
                currency: get("PAYMENT_CURRENCY")
                    .unwrap_or_else(|| "inr".to_string())
                    .to_lowercase(),
            },
            cloudinary,
            allowed_origins,
        })
    }
}
