use actix_web::{
    get, http::StatusCode, post,
    web::{self, Json},
    HttpMessage, HttpRequest, HttpResponse,
};

use crate::{
    errors::ApiError,
    middlewares::auth::issue_token,
    models::admin,
    schema::{admin::{AdminCredentials, ChangePasswordPayload}, validate_payload, ApiResponse, AuthAdmin},
    utils::{hash_password, random_string, verify_password},
    GlobalState,
};

/// The one username allowed to register an account.
const ALLOWED_SIGNUP_USERNAME: &str = "emma";

#[post("/signin")]
pub async fn signin_handler(
    data: web::Data<GlobalState>,
    body: Json<AdminCredentials>,
) -> Result<HttpResponse, ApiError> {
    let creds = body.into_inner();
    validate_payload(&creds)?;

    let admin = admin::find_by_username(&data.pool, &creds.username)
        .await?
        .ok_or_else(|| ApiError::Validation("Invalid username or password.".to_string()))?;

    verify_password(&creds.password, &admin.password)
        .map_err(|_| ApiError::Validation("Invalid username or password.".to_string()))?;

    let token = issue_token(admin.id, &admin.username, &data.config.jwt_secret)?;
    Ok(ApiResponse::ok(token, "Sign in success."))
}

#[post("/signup")]
pub async fn signup_handler(
    data: web::Data<GlobalState>,
    body: Json<AdminCredentials>,
) -> Result<HttpResponse, ApiError> {
    let creds = body.into_inner();
    validate_payload(&creds)?;

    if creds.username != ALLOWED_SIGNUP_USERNAME {
        return Err(ApiError::Forbidden("Only Emma can sign up on this website.".to_string()));
    }

    if admin::find_by_username(&data.pool, &creds.username).await?.is_some() {
        return Err(ApiError::Validation(
            "User with this username already registered.".to_string(),
        ));
    }

    let password_hash = hash_password(&creds.password)
        .map_err(|_| ApiError::Internal("Internal server error.".to_string()))?;

    let created = admin::create_admin(&data.pool, &creds.username, &password_hash).await?;

    let token = issue_token(created.id, &created.username, &data.config.jwt_secret)?;
    Ok(ApiResponse::ok(token, "Sign up success."))
}

#[get("/forgot/{username}")]
pub async fn forgot_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner();

    let admin = admin::find_by_username(&data.pool, &username)
        .await?
        .ok_or_else(|| ApiError::Validation("Invalid username.".to_string()))?;

    let token = format!("{}{}", random_string(16), admin.username);
    admin::set_forgot_token(&data.pool, &admin.username, &token).await?.ok_or_else(|| {
        ApiError::Database("Could not save to db. Please try again later.".to_string())
    })?;

    let url =
        format!("{}/api/v1/admins/forgotRedirect/{}", data.config.public_base_url, token);
    let email = crate::email::reset_link_message(&data.config.operator_email, &admin.username, &url);
    data.mailer.send(email).await.map_err(|_| {
        ApiError::Email("Could not send email. Please try again later.".to_string())
    })?;

    Ok(ApiResponse::message_only("Please check Your email."))
}

/// Consumes a reset handle: generates a fresh password, stores its hash and
/// mails the password out. The handle is single-use.
#[get("/forgotRedirect/{token}")]
pub async fn forgot_redirect_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let token = path.into_inner();

    let new_password = random_string(6);
    let password_hash = hash_password(&new_password)
        .map_err(|_| ApiError::Internal("Internal server error.".to_string()))?;

    let admin = admin::consume_forgot_token(&data.pool, &token, &password_hash)
        .await?
        .ok_or_else(|| ApiError::Validation("Invalid route parameter url.".to_string()))?;

    let email = crate::email::new_password_message(
        &data.config.operator_email,
        &admin.username,
        &new_password,
    );
    data.mailer.send(email).await.map_err(|e| {
        tracing::error!(error = %e, "could not send new-password email");
        ApiError::Email("Could not send email. Please try again later.".to_string())
    })?;

    Ok(ApiResponse::message_only("Check your email for new password."))
}

#[post("")]
pub async fn change_password_handler(
    data: web::Data<GlobalState>,
    req: HttpRequest,
    body: Json<ChangePasswordPayload>,
) -> Result<HttpResponse, ApiError> {
    let caller = req.extensions().get::<AuthAdmin>().cloned().ok_or(ApiError::MissingToken)?;

    let payload = body.into_inner();
    validate_payload(&payload)?;

    let password_hash = hash_password(&payload.password)
        .map_err(|_| ApiError::Internal("Internal server error.".to_string()))?;

    let admin = admin::set_password(&data.pool, caller.id, &password_hash).await?.ok_or_else(
        || ApiError::not_found("User with given id was not found.", StatusCode::BAD_REQUEST),
    )?;

    let token = issue_token(admin.id, &admin.username, &data.config.jwt_secret)?;
    Ok(ApiResponse::ok(token, "Password changed."))
}

#[cfg(test)]
mod tests {
    use crate::schema::ApiResponse;
    use crate::test_init_app::init;
    use actix_web::test;

    #[actix_web::test]
    async fn only_emma_can_sign_up() {
        let (app, _ctx) = init().await;

        let res = test::TestRequest::post()
            .uri("/api/v1/admins/signup")
            .set_json(serde_json::json!({"username": "bob", "password": "secret123"}))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), 403);

        let body: ApiResponse<serde_json::Value> = test::read_body_json(res).await;
        assert_eq!(body.message, "Only Emma can sign up on this website.");
        assert_eq!(body.status, 403);
    }

    #[actix_web::test]
    async fn short_signup_credentials_are_rejected() {
        let (app, _ctx) = init().await;

        let res = test::TestRequest::post()
            .uri("/api/v1/admins/signup")
            .set_json(serde_json::json!({"username": "emma", "password": "ab"}))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), 400);

        let body: ApiResponse<serde_json::Value> = test::read_body_json(res).await;
        assert_eq!(body.message, "password: must be at least 3 characters long");
    }

    #[actix_web::test]
    async fn change_password_requires_a_token() {
        let (app, _ctx) = init().await;

        let res = test::TestRequest::post()
            .uri("/api/v1/admins/changePassword")
            .set_json(serde_json::json!({"password": "secret123"}))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), 401);
    }
}
