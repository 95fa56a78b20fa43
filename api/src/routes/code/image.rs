use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use dragon_shared::ApiResponse;

use super::CHALLENGE_KEY_HEADER;
use crate::app::AppState;
use crate::dto::{ImageCodeQuery, ImageCodeResponse, ImageFormat};
use crate::handlers::error::{handle_domain_error, request_language};

/// Handler for GET /dragon/code/image
///
/// Issues a visual code under a fresh session key. By default the response
/// body is the rendered image and the key travels in `X-Challenge-Key`;
/// `?format=json` returns both in a JSON envelope with the image as a
/// base64 data URI. Either way the response must not be cached.
pub async fn get_image_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ImageCodeQuery>,
) -> HttpResponse {
    let lang = request_language(&req);

    let challenge = match state.verification.issue_image_challenge().await {
        Ok(challenge) => challenge,
        Err(e) => return handle_domain_error(&e, lang),
    };

    let no_store = CacheControl(vec![CacheDirective::NoStore]);
    match query.format {
        ImageFormat::Raw => HttpResponse::Ok()
            .content_type(challenge.image.content_type.clone())
            .insert_header(no_store)
            .insert_header((CHALLENGE_KEY_HEADER, challenge.key.as_str()))
            .body(challenge.image.bytes),
        ImageFormat::Json => HttpResponse::Ok()
            .insert_header(no_store)
            .insert_header((CHALLENGE_KEY_HEADER, challenge.key.as_str()))
            .json(ApiResponse::success(ImageCodeResponse::from_challenge(&challenge, Utc::now()))),
    }
}
