use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One phase of a course programme. All fields are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    #[validate(length(min = 1, message = "is required"))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, message = "is required"))]
    #[serde(default)]
    pub description: String,
    #[validate(required(message = "is required"))]
    pub phase_order: Option<i32>,
    #[validate(length(min = 1, message = "must contain at least one theme"))]
    #[serde(default)]
    pub themes: Vec<String>,
}

/// Per-language course content. The same shape is validated on the way in
/// and stored verbatim in the language columns, so the two cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourseContent {
    #[validate(length(min = 1, message = "is required"))]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub detailed_description: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub what_will_learn: Vec<String>,
    #[serde(default)]
    pub who_can_attend: Vec<String>,
    #[validate(length(min = 1, message = "at least one phase is required"), nested)]
    #[serde(default)]
    pub phases: Vec<Phase>,
}

/// Create/update body. Updates are full replacements, never patches, and
/// must carry all three valid language subdocuments.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    #[validate(length(min = 1, message = "is required"))]
    #[serde(default)]
    pub route_url: String,
    #[validate(nested)]
    pub hy: CourseContent,
    #[validate(nested)]
    pub ru: CourseContent,
    #[validate(nested)]
    pub en: CourseContent,
    #[serde(default = "default_true")]
    pub is_primary: bool,
    #[validate(length(min = 1, message = "at least one instructor is required"))]
    #[serde(default)]
    pub instructors: Vec<Uuid>,
    #[serde(default)]
    pub connected_courses_ids: Vec<Uuid>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Single-language view of one course: the shared fields plus the selected
/// language subdocument nested under `course`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedCourse {
    pub id: Uuid,
    pub route_url: String,
    pub image_url: String,
    pub icon_url: String,
    pub is_primary: bool,
    pub instructors: Vec<Uuid>,
    pub connected_courses_ids: Vec<Uuid>,
    pub start_time: DateTime<Utc>,
    pub price: Option<f64>,
    pub course: CourseContent,
}

/// Single-language list entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: Uuid,
    pub name: String,
    pub icon_url: String,
    pub is_primary: bool,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::validate_payload;

    pub(crate) fn content(name: &str, language: &str) -> CourseContent {
        CourseContent {
            name: name.to_string(),
            description: Some("intro".to_string()),
            detailed_description: vec!["part one".to_string()],
            category: Some("programming".to_string()),
            status: Some("open".to_string()),
            language: language.to_string(),
            what_will_learn: vec!["basics".to_string()],
            who_can_attend: vec!["beginners".to_string()],
            phases: vec![Phase {
                title: "Phase 1".to_string(),
                description: "Getting started".to_string(),
                phase_order: Some(1),
                themes: vec!["intro".to_string()],
            }],
        }
    }

    pub(crate) fn payload() -> CoursePayload {
        CoursePayload {
            route_url: "web-development".to_string(),
            hy: content("Վեբ ծրագրավորում", "hy"),
            ru: content("Веб-разработка", "ru"),
            en: content("Web development", "en"),
            is_primary: true,
            instructors: vec![Uuid::new_v4()],
            connected_courses_ids: vec![],
            duration: Some(3.5),
            price: Some(45000.0),
            start_time: None,
        }
    }

    #[test]
    fn complete_payload_validates() {
        assert!(validate_payload(&payload()).is_ok());
    }

    #[test]
    fn missing_name_in_one_language_fails_with_the_path() {
        let mut course = payload();
        course.ru.name = String::new();
        let err = validate_payload(&course).unwrap_err();
        assert_eq!(err.to_string(), "ru.name: is required");
    }

    #[test]
    fn empty_phases_fail() {
        let mut course = payload();
        course.en.phases.clear();
        let err = validate_payload(&course).unwrap_err();
        assert_eq!(err.to_string(), "en.phases: at least one phase is required");
    }

    #[test]
    fn phase_without_themes_fails() {
        let mut course = payload();
        course.hy.phases[0].themes.clear();
        let err = validate_payload(&course).unwrap_err();
        assert_eq!(err.to_string(), "hy.phases[0].themes: must contain at least one theme");
    }

    #[test]
    fn phase_without_order_fails() {
        let mut course = payload();
        course.hy.phases[0].phase_order = None;
        let err = validate_payload(&course).unwrap_err();
        assert_eq!(err.to_string(), "hy.phases[0].phase_order: is required");
    }

    #[test]
    fn empty_instructor_list_fails() {
        let mut course = payload();
        course.instructors.clear();
        let err = validate_payload(&course).unwrap_err();
        assert_eq!(err.to_string(), "instructors: at least one instructor is required");
    }

    #[test]
    fn payload_json_uses_camel_case() {
        let json = serde_json::to_value(payload()).unwrap();
        assert!(json.get("routeUrl").is_some());
        assert!(json.get("connectedCoursesIds").is_some());
        assert!(json["hy"].get("whatWillLearn").is_some());
        assert!(json["hy"]["phases"][0].get("phaseOrder").is_some());
    }
}
