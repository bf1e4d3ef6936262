use actix_multipart::Multipart;
use actix_web::{
    delete, get, http::StatusCode, post, put,
    web::{self, Json},
    HttpRequest, HttpResponse,
};

use crate::{
    errors::ApiError,
    i18n::Language,
    images::{read_image_field, AssetKind, ReceivedImage, StoredImage},
    models::course::{self, CourseDoc},
    schema::{course::{CoursePayload, CourseSummary}, validate_payload, ApiResponse},
    utils::parse_id,
    GlobalState,
};

#[get("")]
pub async fn list_courses_handler(
    data: web::Data<GlobalState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let lang = Language::from_request(&req);
    let courses = course::get_all_courses(&data.pool).await?;
    let summaries: Vec<CourseSummary> = courses.iter().map(|c| c.summary(lang)).collect();

    Ok(ApiResponse::ok(summaries, "All courses."))
}

#[get("/{id}")]
pub async fn get_course_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let lang = Language::from_request(&req);

    let course = course::get_course_by_id(&data.pool, id).await?.ok_or_else(|| {
        ApiError::not_found("Course with given id was not found.", StatusCode::BAD_REQUEST)
    })?;

    Ok(ApiResponse::ok(course.project(lang), format!("Course with id {id}")))
}

/// Unprojected trilingual listing for the admin panel.
#[get("")]
pub async fn get_full_courses_handler(
    data: web::Data<GlobalState>,
) -> Result<HttpResponse, ApiError> {
    let courses = course::get_all_courses(&data.pool).await?;
    Ok(ApiResponse::ok(courses, "All courses in website."))
}

#[get("/{id}")]
pub async fn get_full_course_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let course = course::get_course_by_id(&data.pool, id).await?.ok_or_else(|| {
        ApiError::not_found("Course with given id was not found.", StatusCode::BAD_REQUEST)
    })?;

    Ok(ApiResponse::ok(course, format!("Course with id {id}")))
}

#[post("")]
pub async fn create_course_handler(
    data: web::Data<GlobalState>,
    body: Json<CoursePayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    validate_payload(&payload)?;

    let doc = CourseDoc::new(payload);
    let created = course::create_course(&data.pool, &doc).await?;

    Ok(ApiResponse::ok(created, "Course have been added."))
}

#[put("/{id}")]
pub async fn update_course_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
    body: Json<CoursePayload>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let payload = body.into_inner();
    validate_payload(&payload)?;

    if payload.connected_courses_ids.contains(&id) {
        return Err(ApiError::Validation(format!(
            "A course cannot be connected with itself. Remove {} from connected courses.",
            payload.hy.name
        )));
    }

    let updated = course::update_course(&data.pool, id, &payload).await?.ok_or_else(|| {
        ApiError::not_found("Course with given id was not found.", StatusCode::NOT_FOUND)
    })?;

    let message = format!("Course {} updated.", updated.content(Language::Hy).name);
    Ok(ApiResponse::ok(updated, message))
}

#[put("/{id}")]
pub async fn upload_course_image_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let upload = read_image_field(&mut payload, AssetKind::CourseImage.field_name()).await?;

    let course = course::get_course_by_id(&data.pool, id).await?.ok_or_else(|| {
        ApiError::not_found("Course with given id was not found.", StatusCode::NOT_FOUND)
    })?;

    let stored = store_upload(&data, AssetKind::CourseImage, &upload).await?;
    let updated = course::update_course_image(&data.pool, id, &stored.public_url).await;

    finalize_course_upload(&data, course.image_url.clone(), updated, stored).await
}

#[put("/{id}")]
pub async fn upload_course_icon_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let upload = read_image_field(&mut payload, AssetKind::CourseIcon.field_name()).await?;

    let course = course::get_course_by_id(&data.pool, id).await?.ok_or_else(|| {
        ApiError::not_found("Course with given id was not found.", StatusCode::NOT_FOUND)
    })?;

    let stored = store_upload(&data, AssetKind::CourseIcon, &upload).await?;
    let updated = course::update_course_icon(&data.pool, id, &stored.public_url).await;

    finalize_course_upload(&data, course.icon_url.clone(), updated, stored).await
}

#[delete("/{id}")]
pub async fn delete_course_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;

    let deleted = course::delete_course(&data.pool, id).await?.ok_or_else(|| {
        ApiError::not_found("Course with given id was not found.", StatusCode::BAD_REQUEST)
    })?;

    // default assets are shared, resolve_custom keeps them off the queue
    for url in [&deleted.image_url, &deleted.icon_url] {
        if let Some(stale) = data.images.resolve_custom(url) {
            data.cleanup.enqueue(stale);
        }
    }

    Ok(ApiResponse::ok(deleted, "Course has been deleted."))
}

async fn store_upload(
    data: &web::Data<GlobalState>,
    kind: AssetKind,
    upload: &ReceivedImage,
) -> Result<StoredImage, ApiError> {
    let temp = data.images.save_temp(&upload.bytes).await?;
    data.images.promote(&temp, kind, &upload.original_name).await
}

/// Last step of the upload state machine: on a successful document update
/// the replaced asset is queued for removal; on failure the just-written
/// file is unlinked so no orphan stays behind.
async fn finalize_course_upload(
    data: &web::Data<GlobalState>,
    old_url: String,
    updated: Result<Option<CourseDoc>, ApiError>,
    stored: StoredImage,
) -> Result<HttpResponse, ApiError> {
    match updated {
        Ok(Some(course)) => {
            if let Some(stale) = data.images.resolve_custom(&old_url) {
                data.cleanup.enqueue(stale);
            }
            let message = format!("Image uploaded for {}", course.content(Language::Hy).name);
            Ok(ApiResponse::ok(course, message))
        }
        Ok(None) | Err(_) => {
            data.images.discard(&stored.path).await;
            Err(ApiError::Internal(
                "Could not upload course image. Please try again later.".to_string(),
            ))
        }
    }
}
