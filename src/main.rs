use std::sync::Arc;

use actix_files::Files;
use actix_web::{
    guard,
    middleware::{from_fn, DefaultHeaders},
    web, App, HttpServer, Scope,
};
use dotenv::dotenv;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use email::{Mailer, SmtpMailer};
use errors::{ApiError, AppError};
use images::{CleanupQueue, ImageStore};
use middlewares::auth::auth_guard;

mod config;
mod constants;
mod email;
mod errors;
mod handlers;
mod i18n;
mod images;
mod middlewares;
mod models;
mod schema;
#[cfg(test)]
mod test_init_app;
mod utils;

/// Explicitly constructed services, shared with every handler through
/// `web::Data`. Tests build the same struct around fakes.
pub struct GlobalState {
    pub pool: Pool<Postgres>,
    pub config: Config,
    pub images: ImageStore,
    pub mailer: Arc<dyn Mailer>,
    pub cleanup: CleanupQueue,
}

/// Malformed JSON bodies go through the same envelope as everything else.
pub(crate) fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| actix_web::Error::from(ApiError::Validation(err.to_string())))
}

/// The catalog frontend is served from a separate origin.
pub(crate) fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*")).add((
        "Access-Control-Allow-Headers",
        "Origin, X-Requested-With, Content-Type, Accept, language, x-auth-token",
    ))
}

/// Full route tree, shared between the server and the test initializer.
pub(crate) fn api_scope() -> Scope {
    web::scope("/api/v1")
        .service(handlers::contact::send_contact_handler)
        // /courses/full and the upload scopes must be registered before the
        // /courses scopes, else /{id} would swallow their first segment
        .service(
            web::scope("/courses/full")
                .wrap(from_fn(auth_guard))
                .service(handlers::course::get_full_courses_handler)
                .service(handlers::course::get_full_course_handler),
        )
        .service(
            web::scope("/courses/uploadImage")
                .wrap(from_fn(auth_guard))
                .service(handlers::course::upload_course_image_handler),
        )
        .service(
            web::scope("/courses/uploadIcon")
                .wrap(from_fn(auth_guard))
                .service(handlers::course::upload_course_icon_handler),
        )
        // public reads; other methods fall through to the guarded scope below
        .service(
            web::scope("/courses")
                .guard(guard::Get())
                .service(handlers::course::list_courses_handler)
                .service(handlers::course::get_course_handler),
        )
        .service(
            web::scope("/courses")
                .wrap(from_fn(auth_guard))
                .service(handlers::course::create_course_handler)
                .service(handlers::course::update_course_handler)
                .service(handlers::course::delete_course_handler),
        )
        .service(
            web::scope("/instructors/uploadImage")
                .wrap(from_fn(auth_guard))
                .service(handlers::instructor::upload_instructor_image_handler),
        )
        .service(
            web::scope("/instructors")
                .guard(guard::Get())
                .service(handlers::instructor::list_instructors_handler)
                .service(handlers::instructor::get_instructor_handler),
        )
        .service(
            web::scope("/instructors")
                .wrap(from_fn(auth_guard))
                .service(handlers::instructor::create_instructor_handler)
                .service(handlers::instructor::update_instructor_handler)
                .service(handlers::instructor::delete_instructor_handler),
        )
        .service(
            web::scope("/admins/changePassword")
                .wrap(from_fn(auth_guard))
                .service(handlers::admin::change_password_handler),
        )
        .service(
            web::scope("/admins")
                .service(handlers::admin::signin_handler)
                .service(handlers::admin::signup_handler)
                .service(handlers::admin::forgot_handler)
                .service(handlers::admin::forgot_redirect_handler),
        )
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|_e| AppError::DbConnect)?;

    sqlx::migrate!().run(&pool).await.map_err(|_e| AppError::Migrate)?;

    let images = ImageStore::new(config.public_dir.clone())
        .await
        .map_err(|_e| AppError::ImageStore)?;

    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(&config)?);
    let cleanup = CleanupQueue::start(mailer.clone(), config.operator_email.clone());

    let bind_addr = config.bind_addr.clone();
    let public_dir = config.public_dir.clone();

    let app_data = web::Data::new(GlobalState { pool, config, images, mailer, cleanup });

    info!("The Server is running at {bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .app_data(json_config())
            .wrap(cors_headers())
            .service(Files::new("/static", public_dir.clone()))
            .service(api_scope())
            .default_service(web::route().to(handlers::not_found))
    })
    .bind(&bind_addr)
    .map_err(|_e| AppError::SocketBind)?
    .run()
    .await
    .map_err(|_e| AppError::ServerStart)?;

    Ok(())
}
