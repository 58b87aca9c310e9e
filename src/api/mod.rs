pub mod accounts;
pub mod admins;
pub mod courses;
pub mod health;
pub mod orders;
pub mod swagger;
pub mod users;

use actix_web::web;

use crate::middleware::Authenticate;
use crate::utils::AppError;

/// Base64 course images travel inside the JSON body.
const JSON_LIMIT: usize = 10 * 1024 * 1024;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            log::debug!("Rejected JSON body: {}", err);
            AppError::InvalidRequest(err.to_string()).into()
        })
}

/// Mounts every route; shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1/user")
                .route("/signup", web::post().to(users::signup))
                .route("/login", web::post().to(users::login))
                .route("/logout", web::get().to(users::logout))
                .service(
                    web::resource("/purchases")
                        .wrap(Authenticate::user())
                        .route(web::get().to(users::purchases)),
                ),
        )
        .service(
            web::scope("/api/v1/admin")
                .route("/signup", web::post().to(admins::signup))
                .route("/login", web::post().to(admins::login))
                .route("/logout", web::get().to(admins::logout)),
        )
        .service(
            web::scope("/api/v1/course")
                .service(
                    web::resource("/create")
                        .wrap(Authenticate::admin())
                        .route(web::post().to(courses::create_course)),
                )
                .service(
                    web::resource("/update/{course_id}")
                        .wrap(Authenticate::admin())
                        .route(web::put().to(courses::update_course)),
                )
                .service(
                    web::resource("/delete/{course_id}")
                        .wrap(Authenticate::admin())
                        .route(web::delete().to(courses::delete_course)),
                )
                .service(
                    web::resource("/buy/{course_id}")
                        .wrap(Authenticate::user())
                        .route(web::post().to(courses::buy_course)),
                )
                .route("/courses", web::get().to(courses::list_courses))
                // catch-all, keep last
                .route("/{course_id}", web::get().to(courses::course_details)),
        )
        .service(
            web::resource("/api/v1/order")
                .wrap(Authenticate::user())
                .route(web::post().to(orders::create_order)),
        );
}
