pub mod auth;
pub mod security_headers;

pub use auth::Authenticate;
pub use security_headers::SecurityHeaders;
