pub mod auth_service;
pub mod course_service;
pub mod image_service;
pub mod order_service;
pub mod payment_service;
pub mod purchase_service;

pub use image_service::{CloudinaryClient, DisabledImageStore, ImageStore};
pub use payment_service::{PaymentGateway, StripeClient};
