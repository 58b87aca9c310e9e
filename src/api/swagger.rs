use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Course Store API",
        version = "1.0.0",
        description = "Backend for an online course storefront.\n\n**Authentication:** user and admin routes take separate JWT bearer tokens, issued by the matching login endpoint."
    ),
    paths(
        crate::api::health::health_check,

        crate::api::users::signup,
        crate::api::users::login,
        crate::api::users::logout,
        crate::api::users::purchases,

        crate::api::admins::signup,
        crate::api::admins::login,
        crate::api::admins::logout,

        crate::api::courses::create_course,
        crate::api::courses::update_course,
        crate::api::courses::delete_course,
        crate::api::courses::list_courses,
        crate::api::courses::course_details,
        crate::api::courses::buy_course,

        crate::api::orders::create_order,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::services::auth_service::SignupRequest,
            crate::services::auth_service::LoginRequest,
            crate::models::AccountView,
            crate::api::users::UserSignupResponse,
            crate::api::users::UserLoginResponse,
            crate::api::users::PurchasesResponse,
            crate::api::admins::AdminSignupResponse,
            crate::api::admins::AdminLoginResponse,
            crate::models::CourseImage,
            crate::models::ImagePayload,
            crate::models::CreateCourseRequest,
            crate::models::UpdateCourseRequest,
            crate::models::UpdateImage,
            crate::models::CourseResponse,
            crate::models::PurchaseResponse,
            crate::api::courses::CourseMessage,
            crate::api::courses::CoursesResponse,
            crate::api::courses::CourseDetails,
            crate::api::courses::CheckoutResponse,
            crate::models::CreateOrderRequest,
            crate::models::OrderResponse,
            crate::api::orders::OrderCreated,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and store connectivity."),
        (name = "User", description = "Learner accounts and owned courses."),
        (name = "Admin", description = "Course author accounts."),
        (name = "Course", description = "Catalog management, browsing and checkout."),
        (name = "Order", description = "Confirmation of paid checkouts."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("User or admin token, depending on the route"))
                        .build(),
                ),
            );
        }
    }
}
