use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::SessionCoordinator;
use crate::error::{AppError, ValidationError};
use crate::middleware::{JwtMiddleware, RequestLogger};
use crate::routes::{health_check, list_users, log_out, me, refresh_token, sign_in, sign_up};

/// Malformed JSON bodies become structured validation errors
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(ValidationError::InvalidFormat(format!("request body: {}", err)))
            .into()
    })
}

pub fn run(
    listener: TcpListener,
    sessions: web::Data<SessionCoordinator>,
) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(sessions.clone())
            .app_data(json_config())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(sign_up))
                    .route("/signin", web::post().to(sign_in))
                    .route("/token", web::post().to(refresh_token))
                    .route("/logout", web::post().to(log_out)),
            )

            // Routes that require an access token
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(sessions.tokens().clone()))
                    .route("/users", web::get().to(list_users))
                    .route("/me", web::get().to(me)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
