use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Per-language instructor content. Every field is optional; instructors
/// are routinely created before all translations exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InstructorContent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Create/update body: the three subdocuments must be present, their
/// fields may be empty.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InstructorPayload {
    #[validate(nested)]
    pub hy: InstructorContent,
    #[validate(nested)]
    pub ru: InstructorContent,
    #[validate(nested)]
    pub en: InstructorContent,
}

/// Single-language instructor view. Unlike courses the content fields are
/// flattened, there is no nested wrapper. Missing translations project as
/// nulls instead of failing the read.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedInstructor {
    pub id: Uuid,
    pub image_url: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_payload;

    #[test]
    fn empty_subdocuments_are_valid() {
        let payload = InstructorPayload {
            hy: InstructorContent::default(),
            ru: InstructorContent::default(),
            en: InstructorContent::default(),
        };
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn missing_subdocument_is_a_deserialization_error() {
        let result = serde_json::from_str::<InstructorPayload>(r#"{"hy": {}, "ru": {}}"#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("en"));
    }
}
