use serde::Serialize;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::constants::DEFAULT_INSTRUCTOR_IMAGE_URL;
use crate::errors::ApiError;
use crate::i18n::Language;
use crate::schema::instructor::{InstructorContent, InstructorPayload, ProjectedInstructor};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InstructorDoc {
    pub id: Uuid,
    pub image_url: String,
    pub hy: Json<InstructorContent>,
    pub ru: Json<InstructorContent>,
    pub en: Json<InstructorContent>,
}

impl InstructorDoc {
    pub fn new(payload: InstructorPayload) -> InstructorDoc {
        InstructorDoc {
            id: Uuid::new_v4(),
            image_url: DEFAULT_INSTRUCTOR_IMAGE_URL.to_string(),
            hy: Json(payload.hy),
            ru: Json(payload.ru),
            en: Json(payload.en),
        }
    }

    pub fn content(&self, lang: Language) -> &InstructorContent {
        match lang {
            Language::Hy => &self.hy.0,
            Language::Ru => &self.ru.0,
            Language::En => &self.en.0,
        }
    }

    /// Display name used in response messages; falls back through the
    /// languages before giving up on the id.
    pub fn display_name(&self) -> String {
        [&self.hy.0, &self.ru.0, &self.en.0]
            .iter()
            .find_map(|content| content.name.clone())
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Flattened single-language view. Missing translations come out as
    /// nulls, a read never fails because a translation is absent.
    pub fn project(&self, lang: Language) -> ProjectedInstructor {
        let content = self.content(lang);
        ProjectedInstructor {
            id: self.id,
            image_url: self.image_url.clone(),
            name: content.name.clone(),
            category: content.category.clone(),
            description: content.description.clone(),
        }
    }
}

pub async fn create_instructor(
    pool: &Pool<Postgres>,
    doc: &InstructorDoc,
) -> Result<InstructorDoc, ApiError> {
    sqlx::query_as::<_, InstructorDoc>(
        r#"
            INSERT INTO instructors (id, image_url, hy, ru, en)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
        "#,
    )
    .bind(doc.id)
    .bind(&doc.image_url)
    .bind(&doc.hy)
    .bind(&doc.ru)
    .bind(&doc.en)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "instructor insert failed");
        ApiError::Database("Error while creating the instructor.".to_string())
    })
}

pub async fn get_instructor_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<InstructorDoc>, ApiError> {
    sqlx::query_as::<_, InstructorDoc>("SELECT * FROM instructors WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "instructor fetch failed");
            ApiError::Database("Error while fetching the instructor.".to_string())
        })
}

pub async fn get_all_instructors(pool: &Pool<Postgres>) -> Result<Vec<InstructorDoc>, ApiError> {
    sqlx::query_as::<_, InstructorDoc>("SELECT * FROM instructors")
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "instructor list failed");
            ApiError::Database("Error while fetching all the instructors.".to_string())
        })
}

/// Replaces the three subdocuments. The image url only changes through the
/// upload endpoint.
pub async fn update_instructor(
    pool: &Pool<Postgres>,
    id: Uuid,
    payload: &InstructorPayload,
) -> Result<Option<InstructorDoc>, ApiError> {
    sqlx::query_as::<_, InstructorDoc>(
        r#"
            UPDATE instructors
            SET hy = $2, ru = $3, en = $4
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(id)
    .bind(Json(&payload.hy))
    .bind(Json(&payload.ru))
    .bind(Json(&payload.en))
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "instructor update failed");
        ApiError::Database("Error while updating the instructor.".to_string())
    })
}

pub async fn update_instructor_image(
    pool: &Pool<Postgres>,
    id: Uuid,
    image_url: &str,
) -> Result<Option<InstructorDoc>, ApiError> {
    sqlx::query_as::<_, InstructorDoc>(
        "UPDATE instructors SET image_url = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(image_url)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "instructor image update failed");
        ApiError::Database("Error while updating the instructor image.".to_string())
    })
}

pub async fn delete_instructor(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<InstructorDoc>, ApiError> {
    sqlx::query_as::<_, InstructorDoc>("DELETE FROM instructors WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "instructor delete failed");
            ApiError::Database("Error while deleting the instructor.".to_string())
        })
}
