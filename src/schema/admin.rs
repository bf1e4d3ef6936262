use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signin and signup share the same body and the same rules.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AdminCredentials {
    #[validate(length(min = 3, message = "must be at least 3 characters long"))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 3, message = "must be at least 3 characters long"))]
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ChangePasswordPayload {
    #[validate(length(min = 3, message = "must be at least 3 characters long"))]
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_payload;

    #[test]
    fn short_username_is_rejected() {
        let creds = AdminCredentials { username: "em".into(), password: "secret123".into() };
        let err = validate_payload(&creds).unwrap_err();
        assert_eq!(err.to_string(), "username: must be at least 3 characters long");
    }

    #[test]
    fn short_password_is_rejected() {
        let creds = AdminCredentials { username: "emma".into(), password: "ab".into() };
        let err = validate_payload(&creds).unwrap_err();
        assert_eq!(err.to_string(), "password: must be at least 3 characters long");
    }

    #[test]
    fn valid_credentials_pass() {
        let creds = AdminCredentials { username: "emma".into(), password: "secret123".into() };
        assert!(validate_payload(&creds).is_ok());
    }
}
