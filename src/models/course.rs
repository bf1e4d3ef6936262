use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::constants::{DEFAULT_COURSE_ICON_URL, DEFAULT_COURSE_IMAGE_URL};
use crate::errors::ApiError;
use crate::i18n::Language;
use crate::schema::course::{CourseContent, CoursePayload, CourseSummary, ProjectedCourse};

/// Stored course document: language-agnostic columns plus one content
/// subdocument per language.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseDoc {
    pub id: Uuid,
    pub route_url: String,
    pub image_url: String,
    pub icon_url: String,
    pub is_primary: bool,
    pub instructors: Vec<Uuid>,
    pub connected_courses_ids: Vec<Uuid>,
    pub duration: Option<f64>,
    pub price: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub hy: Json<CourseContent>,
    pub ru: Json<CourseContent>,
    pub en: Json<CourseContent>,
}

impl CourseDoc {
    /// Builds a fresh document from a validated payload. Image urls always
    /// start as the platform defaults; clients change them only through the
    /// upload endpoints. Start time defaults to 30 days out.
    pub fn new(payload: CoursePayload) -> CourseDoc {
        CourseDoc {
            id: Uuid::new_v4(),
            route_url: payload.route_url,
            image_url: DEFAULT_COURSE_IMAGE_URL.to_string(),
            icon_url: DEFAULT_COURSE_ICON_URL.to_string(),
            is_primary: payload.is_primary,
            instructors: payload.instructors,
            connected_courses_ids: payload.connected_courses_ids,
            duration: payload.duration,
            price: payload.price,
            start_time: payload.start_time.unwrap_or_else(|| Utc::now() + Duration::days(30)),
            hy: Json(payload.hy),
            ru: Json(payload.ru),
            en: Json(payload.en),
        }
    }

    pub fn content(&self, lang: Language) -> &CourseContent {
        match lang {
            Language::Hy => &self.hy.0,
            Language::Ru => &self.ru.0,
            Language::En => &self.en.0,
        }
    }

    /// Full single-language view for the course detail endpoint.
    pub fn project(&self, lang: Language) -> ProjectedCourse {
        ProjectedCourse {
            id: self.id,
            route_url: self.route_url.clone(),
            image_url: self.image_url.clone(),
            icon_url: self.icon_url.clone(),
            is_primary: self.is_primary,
            instructors: self.instructors.clone(),
            connected_courses_ids: self.connected_courses_ids.clone(),
            start_time: self.start_time,
            price: self.price,
            course: self.content(lang).clone(),
        }
    }

    /// Compact single-language view for the course list endpoint.
    pub fn summary(&self, lang: Language) -> CourseSummary {
        CourseSummary {
            id: self.id,
            name: self.content(lang).name.clone(),
            icon_url: self.icon_url.clone(),
            is_primary: self.is_primary,
        }
    }
}

pub async fn create_course(pool: &Pool<Postgres>, doc: &CourseDoc) -> Result<CourseDoc, ApiError> {
    sqlx::query_as::<_, CourseDoc>(
        r#"
            INSERT INTO courses
                (id, route_url, image_url, icon_url, is_primary, instructors,
                 connected_courses_ids, duration, price, start_time, hy, ru, en)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
        "#,
    )
    .bind(doc.id)
    .bind(&doc.route_url)
    .bind(&doc.image_url)
    .bind(&doc.icon_url)
    .bind(doc.is_primary)
    .bind(&doc.instructors)
    .bind(&doc.connected_courses_ids)
    .bind(doc.duration)
    .bind(doc.price)
    .bind(doc.start_time)
    .bind(&doc.hy)
    .bind(&doc.ru)
    .bind(&doc.en)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "course insert failed");
        ApiError::Database("Error while creating the course.".to_string())
    })
}

pub async fn get_course_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<CourseDoc>, ApiError> {
    sqlx::query_as::<_, CourseDoc>("SELECT * FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "course fetch failed");
            ApiError::Database("Error while fetching the course.".to_string())
        })
}

pub async fn get_all_courses(pool: &Pool<Postgres>) -> Result<Vec<CourseDoc>, ApiError> {
    sqlx::query_as::<_, CourseDoc>("SELECT * FROM courses")
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "course list failed");
            ApiError::Database("Error while fetching all the courses.".to_string())
        })
}

/// Full replacement of the mutable fields. Image and icon urls are
/// deliberately left out, they only change through the upload endpoints.
/// A missing `start_time` keeps the stored value.
pub async fn update_course(
    pool: &Pool<Postgres>,
    id: Uuid,
    payload: &CoursePayload,
) -> Result<Option<CourseDoc>, ApiError> {
    sqlx::query_as::<_, CourseDoc>(
        r#"
            UPDATE courses
            SET route_url = $2, is_primary = $3, instructors = $4,
                connected_courses_ids = $5, duration = $6, price = $7,
                start_time = COALESCE($8, start_time), hy = $9, ru = $10, en = $11
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(id)
    .bind(&payload.route_url)
    .bind(payload.is_primary)
    .bind(&payload.instructors)
    .bind(&payload.connected_courses_ids)
    .bind(payload.duration)
    .bind(payload.price)
    .bind(payload.start_time)
    .bind(Json(&payload.hy))
    .bind(Json(&payload.ru))
    .bind(Json(&payload.en))
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "course update failed");
        ApiError::Database("Error while updating the course.".to_string())
    })
}

pub async fn update_course_image(
    pool: &Pool<Postgres>,
    id: Uuid,
    image_url: &str,
) -> Result<Option<CourseDoc>, ApiError> {
    sqlx::query_as::<_, CourseDoc>(
        "UPDATE courses SET image_url = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(image_url)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "course image update failed");
        ApiError::Database("Error while updating the course image.".to_string())
    })
}

pub async fn update_course_icon(
    pool: &Pool<Postgres>,
    id: Uuid,
    icon_url: &str,
) -> Result<Option<CourseDoc>, ApiError> {
    sqlx::query_as::<_, CourseDoc>(
        "UPDATE courses SET icon_url = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(icon_url)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "course icon update failed");
        ApiError::Database("Error while updating the course icon.".to_string())
    })
}

/// Removes the document and returns the deleted snapshot so the caller can
/// schedule asset cleanup.
pub async fn delete_course(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<CourseDoc>, ApiError> {
    sqlx::query_as::<_, CourseDoc>("DELETE FROM courses WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "course delete failed");
            ApiError::Database("Error while deleting the course.".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::course::tests::payload;

    #[test]
    fn new_course_applies_platform_defaults() {
        let doc = CourseDoc::new(payload());
        assert_eq!(doc.image_url, DEFAULT_COURSE_IMAGE_URL);
        assert_eq!(doc.icon_url, DEFAULT_COURSE_ICON_URL);
        assert!(doc.start_time > Utc::now() + Duration::days(29));
        assert!(doc.start_time < Utc::now() + Duration::days(31));
    }

    #[test]
    fn explicit_start_time_is_kept() {
        let mut body = payload();
        let start = Utc::now() + Duration::days(7);
        body.start_time = Some(start);
        let doc = CourseDoc::new(body);
        assert_eq!(doc.start_time, start);
    }

    #[test]
    fn projection_selects_the_requested_language() {
        let doc = CourseDoc::new(payload());
        assert_eq!(doc.project(Language::Hy).course.name, "Վեբ ծրագրավորում");
        assert_eq!(doc.project(Language::Ru).course.name, "Веб-разработка");
        assert_eq!(doc.project(Language::En).course.name, "Web development");
    }

    #[test]
    fn projection_keeps_shared_fields_verbatim() {
        let doc = CourseDoc::new(payload());
        let view = doc.project(Language::En);
        assert_eq!(view.id, doc.id);
        assert_eq!(view.route_url, doc.route_url);
        assert_eq!(view.image_url, doc.image_url);
        assert_eq!(view.icon_url, doc.icon_url);
        assert_eq!(view.instructors, doc.instructors);
        assert_eq!(view.connected_courses_ids, doc.connected_courses_ids);
        assert_eq!(view.price, doc.price);
        assert_eq!(view.start_time, doc.start_time);
    }

    #[test]
    fn projection_copies_the_whole_subdocument() {
        let doc = CourseDoc::new(payload());
        let view = doc.project(Language::Ru);
        assert_eq!(view.course, doc.ru.0);
    }

    #[test]
    fn missing_optional_translations_project_as_empty() {
        let mut body = payload();
        body.en.description = None;
        body.en.what_will_learn.clear();
        let doc = CourseDoc::new(body);
        let view = doc.project(Language::En);
        assert_eq!(view.course.description, None);
        assert!(view.course.what_will_learn.is_empty());
    }

    #[test]
    fn summary_is_the_compact_list_shape() {
        let doc = CourseDoc::new(payload());
        let summary = doc.summary(Language::En);
        assert_eq!(summary.id, doc.id);
        assert_eq!(summary.name, "Web development");
        assert_eq!(summary.icon_url, doc.icon_url);
        assert!(summary.is_primary);
    }

    #[test]
    fn projected_json_nests_content_under_course() {
        let doc = CourseDoc::new(payload());
        let json = serde_json::to_value(doc.project(Language::Hy)).unwrap();
        assert_eq!(json["course"]["name"], "Վեբ ծրագրավորում");
        assert!(json.get("routeUrl").is_some());
        assert!(json.get("connectedCoursesIds").is_some());
        // duration is a full-document field, the projection leaves it out
        assert!(json.get("duration").is_none());
    }
}
