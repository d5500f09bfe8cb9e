use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::Value;

use super::models::{BirthNotificationRequest, DeathNotificationRequest, SubmissionResponse};
use super::{build_birth_notification, build_death_notification, FhirError};
use crate::validation::Validator;
use crate::{AppState, ErrorResponse};

fn error_response(e: FhirError) -> HttpResponse {
    match e {
        FhirError::Validation(errors) => {
            HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
        FhirError::UnknownFacility(_) => {
            warn!("{}", e);
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()))
        }
        FhirError::Http(_) | FhirError::Upstream { .. } | FhirError::MalformedResponse(_) => {
            HttpResponse::BadGateway().json(ErrorResponse::bad_gateway(&e.to_string()))
        }
        FhirError::FacilityIo(_) | FhirError::FacilityParse(_) => {
            error!("{}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

async fn submit(state: &AppState, bundle: Result<Value, FhirError>) -> Result<String, FhirError> {
    let bundle = bundle?;
    state.fhir.submit(&bundle).await
}

#[utoipa::path(
    post,
    path = "/api/notifications/birth",
    tag = "Notifications",
    request_body = BirthNotificationRequest,
    responses(
        (status = 201, description = "Birth notification recorded", body = SubmissionResponse),
        (status = 400, description = "Invalid request or unknown facility", body = ErrorResponse),
        (status = 502, description = "FHIR store failure", body = ErrorResponse)
    )
)]
pub async fn notify_birth(
    state: web::Data<AppState>,
    body: web::Json<BirthNotificationRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let bundle = request
        .validate()
        .map_err(FhirError::Validation)
        .and_then(|_| build_birth_notification(&request, &state.facilities));

    match submit(&state, bundle).await {
        Ok(composition_id) => {
            info!("Birth notification submitted as Composition {}", composition_id);
            HttpResponse::Created().json(SubmissionResponse { composition_id })
        }
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/notifications/death",
    tag = "Notifications",
    request_body = DeathNotificationRequest,
    responses(
        (status = 201, description = "Death notification recorded", body = SubmissionResponse),
        (status = 400, description = "Invalid request or unknown facility", body = ErrorResponse),
        (status = 502, description = "FHIR store failure", body = ErrorResponse)
    )
)]
pub async fn notify_death(
    state: web::Data<AppState>,
    body: web::Json<DeathNotificationRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let bundle = request
        .validate()
        .map_err(FhirError::Validation)
        .and_then(|_| build_death_notification(&request, &state.facilities));

    match submit(&state, bundle).await {
        Ok(composition_id) => {
            info!("Death notification submitted as Composition {}", composition_id);
            HttpResponse::Created().json(SubmissionResponse { composition_id })
        }
        Err(e) => error_response(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/notifications/birth").route(web::post().to(notify_birth)))
        .service(web::resource("/notifications/death").route(web::post().to(notify_death)));
}
