use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{errors::ApiError, schema::{AuthAdmin, JwtClaims}, GlobalState};

/// Signs a one-day token carrying the admin's id and username.
pub fn issue_token(id: Uuid, username: &str, secret: &str) -> Result<String, ApiError> {
    let expires = Utc::now() + Duration::days(1);
    let claims = JwtClaims {
        sub: id.to_string(),
        username: username.to_string(),
        exp: expires.timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| {
            tracing::error!(error = %e, "token signing failed");
            ApiError::Internal("Could not issue auth token.".to_string())
        })
}

/// Verifies signature and expiry, then recovers the caller identity.
pub fn decode_token(token: &str, secret: &str) -> Result<AuthAdmin, ApiError> {
    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::InvalidToken)?;

    let id = Uuid::parse_str(&data.claims.sub).map_err(|_| ApiError::InvalidToken)?;

    Ok(AuthAdmin { id, username: data.claims.username })
}

/// Guard for protected scopes. Expects the token in the `x-auth-token`
/// header and attaches the decoded identity for downstream handlers.
pub async fn auth_guard(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let header = req.headers().get("x-auth-token").ok_or(ApiError::MissingToken)?;
    let token = header.to_str().map_err(|_| ApiError::InvalidToken)?;

    let data = req
        .app_data::<web::Data<GlobalState>>()
        .ok_or_else(|| ApiError::Internal("Application state is missing.".to_string()))?;

    let admin = decode_token(token, &data.config.jwt_secret)?;
    tracing::debug!(admin = %admin.username, "authenticated request");
    req.extensions_mut().insert(admin);

    next.call(req).await
}
