use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpResponse, HttpServer, Responder};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod certificate;
pub mod config;
pub mod fhir;
pub mod notification;
pub mod state;
pub mod validation;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

use crate::validation::{ValidationError, ValidationErrors};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    /// Failing fields, for validation errors only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(value_type = Vec<Object>)]
    pub details: Vec<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: Vec::new(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self::new("BadGateway", message)
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        let mut response = Self::bad_request(&format!(
            "Validation failed: {} error(s) found",
            errors.len()
        ));
        response.details = errors
            .errors()
            .iter()
            .filter_map(|e| serde_json::to_value(e).ok())
            .collect();
        response
    }
}

pub async fn ping() -> impl Responder {
    HttpResponse::Ok().body("pong")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::certificate::handlers::list_certificates,
        crate::certificate::handlers::render_certificate,
        crate::certificate::handlers::list_helpers,
        crate::certificate::handlers::call_helper,
        crate::fhir::handlers::notify_birth,
        crate::fhir::handlers::notify_death,
        crate::notification::handlers::send_email,
        crate::notification::handlers::send_sms
    ),
    components(
        schemas(
            ErrorResponse,
            ValidationError,
            certificate::handlers::TemplateListResponse,
            certificate::handlers::HelperRequest,
            certificate::handlers::HelperResponse,
            certificate::helpers::HelperDescriptor,
            fhir::models::BirthNotificationRequest,
            fhir::models::DeathNotificationRequest,
            fhir::models::PersonInput,
            fhir::models::InformantInput,
            fhir::models::AddressInput,
            fhir::models::Gender,
            fhir::models::SubmissionResponse,
            notification::TemplateName,
            notification::DeliveryStatus,
            notification::handlers::EmailNotificationRequest,
            notification::handlers::SmsNotificationRequest,
            notification::handlers::DeliveryResponse,
        )
    ),
    tags(
        (name = "Certificates", description = "Certificate rendering and template helpers."),
        (name = "Notifications", description = "Health facility notifications and email/SMS delivery.")
    ),
    servers(
        (url = "http://localhost:3040", description = "Local country configuration")
    )
)]
pub struct ApiDoc;

/// Routes under `/api`, shared by the server and the HTTP tests.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(certificate::handlers::config)
            .configure(fhir::handlers::config)
            .configure(notification::handlers::config),
    )
    .service(web::resource("/ping").route(web::get().to(ping)));
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let bind_address = config.bind_address.clone();
    let app_state = web::Data::new(AppState::from_config(config).await?);

    let prometheus = PrometheusMetricsBuilder::new("countryconfig_mdg")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    log::info!(
        "Starting server at http://{} ({} certificate templates, {} facilities)",
        bind_address,
        app_state.certificates.template_names().len(),
        app_state.facilities.len()
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:7000")
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind_address.as_str())?
    .run()
    .await?;

    Ok(())
}
