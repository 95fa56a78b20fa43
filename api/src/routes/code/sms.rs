use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use validator::Validate;

use dragon_shared::phone::mask_phone_number;
use dragon_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::{SmsCodeQuery, SmsCodeResponse};
use crate::handlers::error::{handle_domain_error, request_language, validation_error_response};

/// Handler for GET /dragon/code/sms?mobile=...
///
/// Sends a numeric code to the mobile number, which also becomes the
/// challenge key. Requesting again replaces the outstanding code.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "data": {
///         "key": "8613800000000",
///         "message_id": "mock_...",
///         "expires_at": "2026-01-01T00:02:00Z",
///         "expires_in": 120
///     },
///     "message": "Verification code sent",
///     "timestamp": "2026-01-01T00:00:00Z"
/// }
/// ```
///
/// ## Errors
/// - 400 `INVALID_COUNTRY` / `INVALID_KEY_FORMAT`
/// - 502 `DELIVERY_FAILED` (the code is still stored and verifiable)
pub async fn send_sms_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<SmsCodeQuery>,
) -> HttpResponse {
    let lang = request_language(&req);

    if let Err(errors) = query.validate() {
        return validation_error_response(&errors, lang);
    }

    tracing::debug!(mobile = %mask_phone_number(&query.mobile), "SMS code requested");

    match state.verification.issue_sms_challenge(&query.mobile).await {
        Ok(challenge) => HttpResponse::Ok().json(
            ApiResponse::success(SmsCodeResponse::from_challenge(challenge, Utc::now()))
                .with_message(lang.localize("Verification code sent", "验证码已发送")),
        ),
        Err(e) => handle_domain_error(&e, lang),
    }
}
