//! Application state and factory
//!
//! This module holds the shared application state and builds the
//! Actix-web application with all routes and middleware.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use dragon_core::services::verification::{CodeStore, ImageRenderer, SmsSender, VerificationService};
use dragon_infra::RedisClient;
use dragon_shared::{error_codes, Environment, ErrorResponse, HealthResponse, HealthStatus, ServiceHealth};

use crate::handlers::error::{json_error_handler, query_error_handler};
use crate::middleware::cors::create_cors;
use crate::routes::code::{image::get_image_code, sms::send_sms_code, verify::verify_code};

/// Verification service over trait objects, as wired by the binary
pub type DynVerificationService = VerificationService<dyn CodeStore, dyn SmsSender, dyn ImageRenderer>;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub verification: Arc<DynVerificationService>,
    /// Set when codes live in Redis so `/health` can ping it
    redis_probe: Option<RedisClient>,
}

impl AppState {
    pub fn new(verification: Arc<DynVerificationService>) -> Self {
        Self {
            verification,
            redis_probe: None,
        }
    }

    pub fn with_redis_probe(mut self, client: RedisClient) -> Self {
        self.redis_probe = Some(client);
        self
    }

    /// Health of the code store backend
    pub async fn store_health(&self) -> ServiceHealth {
        match &self.redis_probe {
            None => ServiceHealth::healthy(),
            Some(client) => match client.health_check().await {
                Ok(true) => ServiceHealth::healthy(),
                Ok(false) => ServiceHealth::unhealthy("Unexpected reply to PING"),
                Err(e) => ServiceHealth::unhealthy(e.to_string()),
            },
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
    environment: Environment,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        // Order matters: request tracing wraps CORS
        .wrap(create_cors(environment))
        .wrap(TracingLogger::default())
        .configure(configure_routes)
        .default_service(web::route().to(not_found))
}

/// Register the health check and verification code routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/dragon/code")
            .route("/image", web::get().to(get_image_code))
            .route("/sms", web::get().to(send_sms_code))
            .route("/verify", web::post().to(verify_code)),
    );
}

/// Health check endpoint handler
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let mut services = HashMap::new();
    services.insert("code_store".to_string(), state.store_health().await);

    let health = HealthResponse::from_services(services, env!("CARGO_PKG_VERSION"));
    match health.status {
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(health),
        _ => HttpResponse::Ok().json(health),
    }
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
