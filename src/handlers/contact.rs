use actix_web::{post, web::{self, Json}, HttpResponse};

use crate::{
    email::contact_message,
    errors::ApiError,
    schema::{contact::ContactPayload, validate_payload, ApiResponse},
    GlobalState,
};

/// Public contact form, relayed to the operator address.
#[post("/contact")]
pub async fn send_contact_handler(
    data: web::Data<GlobalState>,
    body: Json<ContactPayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    validate_payload(&payload)?;

    let email = contact_message(&data.config.operator_email, &payload);
    data.mailer
        .send(email)
        .await
        .map_err(|_| ApiError::Email("Could not send email.".to_string()))?;

    Ok(ApiResponse::message_only("Email sent."))
}

#[cfg(test)]
mod tests {
    use crate::schema::ApiResponse;
    use crate::test_init_app::init;
    use actix_web::test;

    #[actix_web::test]
    async fn valid_contact_is_relayed_to_the_operator() {
        let (app, ctx) = init().await;

        let res = test::TestRequest::post()
            .uri("/api/v1/contact")
            .set_json(serde_json::json!({
                "name": "Ani",
                "email": "ani@example.com",
                "message": "When does the next course start?"
            }))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), 200);

        let body: ApiResponse<serde_json::Value> = test::read_body_json(res).await;
        assert_eq!(body.message, "Email sent.");
        assert_eq!(body.data, None);

        let sent = ctx.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("ani@example.com"));
        assert!(sent[0].body.contains("When does the next course start?"));
    }

    #[actix_web::test]
    async fn invalid_email_address_is_rejected() {
        let (app, ctx) = init().await;

        let res = test::TestRequest::post()
            .uri("/api/v1/contact")
            .set_json(serde_json::json!({
                "name": "Ani",
                "email": "nope",
                "message": "hi"
            }))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), 400);

        let body: ApiResponse<serde_json::Value> = test::read_body_json(res).await;
        assert_eq!(body.message, "email: must be a valid email address");
        assert!(ctx.mailer.sent.lock().unwrap().is_empty());
    }
}
