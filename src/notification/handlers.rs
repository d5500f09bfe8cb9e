use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{DeliveryStatus, NotificationError, TemplateName};
use crate::validation::{validate_email, validate_phone, ValidationErrors};
use crate::{AppState, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailNotificationRequest {
    pub template_name: TemplateName,
    pub recipient: String,
    #[serde(default)]
    pub variables: Value,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmsNotificationRequest {
    pub template_name: TemplateName,
    pub recipient: String,
    #[serde(default)]
    pub variables: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryResponse {
    pub status: DeliveryStatus,
}

fn error_response(e: NotificationError) -> HttpResponse {
    match e {
        NotificationError::UnknownTemplate { .. } => {
            HttpResponse::NotFound().json(ErrorResponse::not_found(&e.to_string()))
        }
        NotificationError::NotConfigured(_)
        | NotificationError::Smtp(_)
        | NotificationError::Sms(_) => {
            HttpResponse::BadGateway().json(ErrorResponse::bad_gateway(&e.to_string()))
        }
        _ => HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string())),
    }
}

#[utoipa::path(
    post,
    path = "/api/notify/email",
    tag = "Notifications",
    request_body = EmailNotificationRequest,
    responses(
        (status = 200, description = "Email sent or skipped", body = DeliveryResponse),
        (status = 400, description = "Invalid recipient", body = ErrorResponse),
        (status = 404, description = "No template for this name", body = ErrorResponse),
        (status = 502, description = "Delivery failure", body = ErrorResponse)
    )
)]
pub async fn send_email(
    state: web::Data<AppState>,
    body: web::Json<EmailNotificationRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let mut errors = ValidationErrors::new();
    validate_email(&request.recipient, "recipient", &mut errors);
    if let Err(errors) = errors.into_result() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }

    match state
        .notifications
        .notify_email(request.template_name, &request.recipient, &request.variables)
        .await
    {
        Ok(status) => {
            info!("Email {} to {}: {:?}", request.template_name.key(), request.recipient, status);
            HttpResponse::Ok().json(DeliveryResponse { status })
        }
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/notify/sms",
    tag = "Notifications",
    request_body = SmsNotificationRequest,
    responses(
        (status = 200, description = "SMS sent or skipped", body = DeliveryResponse),
        (status = 400, description = "Invalid recipient", body = ErrorResponse),
        (status = 404, description = "No template for this name", body = ErrorResponse),
        (status = 502, description = "Delivery failure", body = ErrorResponse)
    )
)]
pub async fn send_sms(
    state: web::Data<AppState>,
    body: web::Json<SmsNotificationRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let mut errors = ValidationErrors::new();
    validate_phone(&request.recipient, "recipient", &mut errors);
    if let Err(errors) = errors.into_result() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }

    match state
        .notifications
        .notify_sms(request.template_name, &request.recipient, &request.variables)
        .await
    {
        Ok(status) => {
            info!("SMS {} to {}: {:?}", request.template_name.key(), request.recipient, status);
            HttpResponse::Ok().json(DeliveryResponse { status })
        }
        Err(e) => error_response(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/notify/email").route(web::post().to(send_email)))
        .service(web::resource("/notify/sms").route(web::post().to(send_sms)));
}
