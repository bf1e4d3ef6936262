use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public contact-form body, relayed to the operator address by email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    #[validate(length(min = 1, message = "is required"))]
    #[serde(default)]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_payload;

    fn payload() -> ContactPayload {
        ContactPayload {
            name: "Ani".into(),
            email: "ani@example.com".into(),
            phone_number: None,
            message: "Когда начинается курс?".into(),
        }
    }

    #[test]
    fn valid_contact_passes_without_phone() {
        assert!(validate_payload(&payload()).is_ok());
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut contact = payload();
        contact.email = "not-an-email".into();
        let err = validate_payload(&contact).unwrap_err();
        assert_eq!(err.to_string(), "email: must be a valid email address");
    }

    #[test]
    fn empty_message_is_rejected() {
        let mut contact = payload();
        contact.message = String::new();
        let err = validate_payload(&contact).unwrap_err();
        assert_eq!(err.to_string(), "message: is required");
    }
}
