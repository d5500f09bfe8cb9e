use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::helpers::{HelperCall, HelperDescriptor};
use super::CertificateError;
use crate::{AppState, ErrorResponse};

#[derive(Serialize, ToSchema)]
pub struct TemplateListResponse {
    pub templates: Vec<String>,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct HelperRequest {
    #[serde(default)]
    pub params: Vec<Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub hash: Map<String, Value>,
    /// Root record the helper reads, as a template would see it.
    #[serde(default)]
    pub data: Value,
}

#[derive(Serialize, ToSchema)]
pub struct HelperResponse {
    pub name: String,
    pub result: Value,
}

#[utoipa::path(
    get,
    path = "/api/certificates",
    tag = "Certificates",
    responses(
        (status = 200, description = "Registered certificate templates", body = TemplateListResponse)
    )
)]
pub async fn list_certificates(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(TemplateListResponse {
        templates: state.certificates.template_names(),
    })
}

#[utoipa::path(
    post,
    path = "/api/certificates/{name}/render",
    tag = "Certificates",
    params(
        ("name" = String, Path, description = "Certificate template name, e.g. birth-certificate")
    ),
    request_body(content = serde_json::Value, description = "Flat certificate record"),
    responses(
        (status = 200, description = "Rendered SVG", body = String, content_type = "image/svg+xml"),
        (status = 404, description = "Unknown template", body = ErrorResponse),
        (status = 500, description = "Render failure", body = ErrorResponse)
    )
)]
pub async fn render_certificate(
    state: web::Data<AppState>,
    path: web::Path<String>,
    record: web::Json<Value>,
) -> impl Responder {
    let name = path.into_inner();
    match state.certificates.render(&name, &record.into_inner()) {
        Ok(svg) => {
            info!("Rendered certificate {} ({} bytes)", name, svg.len());
            HttpResponse::Ok().content_type("image/svg+xml").body(svg)
        }
        Err(CertificateError::UnknownTemplate(_)) => {
            warn!("Render requested for unknown certificate {}", name);
            HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
                "Certificate template '{}' does not exist",
                name
            )))
        }
        Err(e) => {
            error!("Failed to render certificate {}: {}", name, e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/helpers",
    tag = "Certificates",
    responses(
        (status = 200, description = "Every template helper", body = Vec<HelperDescriptor>)
    )
)]
pub async fn list_helpers(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.certificates.helpers().descriptors())
}

#[utoipa::path(
    post,
    path = "/api/helpers/{name}",
    tag = "Certificates",
    params(
        ("name" = String, Path, description = "Helper name, e.g. numberToWords")
    ),
    request_body = HelperRequest,
    responses(
        (status = 200, description = "Helper result", body = HelperResponse),
        (status = 404, description = "Unknown helper", body = ErrorResponse)
    )
)]
pub async fn call_helper(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<HelperRequest>,
) -> impl Responder {
    let name = path.into_inner();
    let HelperRequest { params, hash, data } = body.into_inner();
    let call = HelperCall::new(params, hash, &data);

    match state.certificates.helpers().call(&name, &call) {
        Some(result) => HttpResponse::Ok().json(HelperResponse { name, result }),
        None => {
            warn!("Unknown helper requested: {}", name);
            HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
                "Helper '{}' does not exist",
                name
            )))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/certificates").route(web::get().to(list_certificates)))
        .service(
            web::resource("/certificates/{name}/render").route(web::post().to(render_certificate)),
        )
        .service(web::resource("/helpers").route(web::get().to(list_helpers)))
        .service(web::resource("/helpers/{name}").route(web::post().to(call_helper)));
}
