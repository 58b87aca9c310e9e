use std::sync::Arc;

use crate::config::AuthSettings;
use crate::database::Store;
use crate::services::{ImageStore, PaymentGateway};

/// Shared handles every handler and the auth middleware read from `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub payments: Arc<dyn PaymentGateway>,
    pub images: Arc<dyn ImageStore>,
    pub auth: AuthSettings,
}
