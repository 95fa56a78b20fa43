//! CORS middleware configuration for cross-origin requests.
//!
//! Browser pages embed the image code and call the verify endpoint from
//! their own origin, so the API must answer cross-origin requests. The
//! configuration is environment-aware: permissive in development, limited
//! to configured origins otherwise.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use std::env;

use dragon_shared::Environment;

use crate::routes::code::CHALLENGE_KEY_HEADER;

const DEFAULT_MAX_AGE: usize = 3600;

/// Creates a CORS middleware instance configured for `environment`.
///
/// # Environment Variables
/// - `ALLOWED_ORIGINS`: Comma-separated list of allowed origins (non-development only)
/// - `WEB_DOMAIN`: Domain whose `https://` and `https://www.` origins are allowed
/// - `CORS_MAX_AGE`: Max age for preflight cache (default: 3600 seconds)
pub fn create_cors(environment: Environment) -> Cors {
    let max_age = env::var("CORS_MAX_AGE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_AGE);

    if environment.is_development() {
        create_development_cors(max_age)
    } else {
        create_restricted_cors(max_age, &allowed_origins())
    }
}

/// Origins from `ALLOWED_ORIGINS` and `WEB_DOMAIN`
fn allowed_origins() -> Vec<String> {
    let mut origins: Vec<String> = env::var("ALLOWED_ORIGINS")
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    if let Ok(web_domain) = env::var("WEB_DOMAIN") {
        origins.push(format!("https://{}", web_domain));
        origins.push(format!("https://www.{}", web_domain));
    }

    origins
}

fn exposed_headers() -> Vec<header::HeaderName> {
    vec![
        header::HeaderName::from_static(CHALLENGE_KEY_HEADER),
        header::HeaderName::from_static("x-request-id"),
    ]
}

/// Permissive configuration for local development
fn create_development_cors(max_age: usize) -> Cors {
    tracing::info!("Configuring CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::CACHE_CONTROL,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(exposed_headers())
        .max_age(max_age)
}

/// Configuration limited to the given origins plus localhost
fn create_restricted_cors(max_age: usize, origins: &[String]) -> Cors {
    tracing::info!("Configuring CORS for restricted environment");

    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![header::ACCEPT, header::ACCEPT_LANGUAGE, header::CONTENT_TYPE])
        .expose_headers(exposed_headers())
        .max_age(max_age);

    for origin in origins {
        tracing::info!("Adding allowed origin: {}", origin);
        cors = cors.allowed_origin(origin);
    }

    cors.allowed_origin("http://localhost")
        .allowed_origin("https://localhost")
}
