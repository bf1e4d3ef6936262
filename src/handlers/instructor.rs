use actix_multipart::Multipart;
use actix_web::{
    delete, get, http::StatusCode, post, put,
    web::{self, Json},
    HttpRequest, HttpResponse,
};

use crate::{
    errors::ApiError,
    i18n::Language,
    images::{read_image_field, AssetKind},
    models::instructor::{self, InstructorDoc},
    schema::{instructor::{InstructorPayload, ProjectedInstructor}, validate_payload, ApiResponse},
    utils::parse_id,
    GlobalState,
};

#[get("")]
pub async fn list_instructors_handler(
    data: web::Data<GlobalState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let lang = Language::from_request(&req);
    let instructors = instructor::get_all_instructors(&data.pool).await?;
    let projected: Vec<ProjectedInstructor> =
        instructors.iter().map(|i| i.project(lang)).collect();

    Ok(ApiResponse::ok(projected, "All instructors."))
}

#[get("/{id}")]
pub async fn get_instructor_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let lang = Language::from_request(&req);

    let instructor = instructor::get_instructor_by_id(&data.pool, id).await?.ok_or_else(|| {
        ApiError::not_found("Instructor with given id was not found.", StatusCode::BAD_REQUEST)
    })?;

    Ok(ApiResponse::ok(instructor.project(lang), format!("Instructor with id {id}")))
}

#[post("")]
pub async fn create_instructor_handler(
    data: web::Data<GlobalState>,
    body: Json<InstructorPayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    validate_payload(&payload)?;

    let doc = InstructorDoc::new(payload);
    let created = instructor::create_instructor(&data.pool, &doc).await?;

    Ok(ApiResponse::ok(created, "New instructor added."))
}

#[put("/{id}")]
pub async fn update_instructor_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
    body: Json<InstructorPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let payload = body.into_inner();
    validate_payload(&payload)?;

    let updated = instructor::update_instructor(&data.pool, id, &payload).await?.ok_or_else(
        || ApiError::not_found("Instructor with given id was not found.", StatusCode::NOT_FOUND),
    )?;

    Ok(ApiResponse::ok(updated, "Instructor updated."))
}

#[put("/{id}")]
pub async fn upload_instructor_image_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let upload =
        read_image_field(&mut payload, AssetKind::InstructorImage.field_name()).await?;

    let instructor = instructor::get_instructor_by_id(&data.pool, id).await?.ok_or_else(
        || ApiError::not_found("Instructor with given id was not found.", StatusCode::NOT_FOUND),
    )?;

    let temp = data.images.save_temp(&upload.bytes).await?;
    let stored =
        data.images.promote(&temp, AssetKind::InstructorImage, &upload.original_name).await?;

    match instructor::update_instructor_image(&data.pool, id, &stored.public_url).await {
        Ok(Some(updated)) => {
            if let Some(stale) = data.images.resolve_custom(&instructor.image_url) {
                data.cleanup.enqueue(stale);
            }
            let message = format!("Image uploaded for {}", updated.display_name());
            Ok(ApiResponse::ok(updated, message))
        }
        Ok(None) | Err(_) => {
            data.images.discard(&stored.path).await;
            Err(ApiError::Internal("Could not upload image. Please try again later.".to_string()))
        }
    }
}

#[delete("/{id}")]
pub async fn delete_instructor_handler(
    data: web::Data<GlobalState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;

    let deleted = instructor::delete_instructor(&data.pool, id).await?.ok_or_else(|| {
        ApiError::not_found("Instructor with given id was not found.", StatusCode::BAD_REQUEST)
    })?;

    if let Some(stale) = data.images.resolve_custom(&deleted.image_url) {
        data.cleanup.enqueue(stale);
    }

    Ok(ApiResponse::ok(deleted, "Instructor has been deleted."))
}
