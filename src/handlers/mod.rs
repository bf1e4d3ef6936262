pub mod admin;
pub mod contact;
pub mod course;
pub mod instructor;

use actix_web::HttpResponse;

use crate::schema::ApiResponse;

/// Terminal handler for every unmatched route.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()> {
        data: None,
        error: Some("invalid url".to_string()),
        message: "not found".to_string(),
        status: 404,
    })
}
