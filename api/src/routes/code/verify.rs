use actix_web::{web, HttpRequest, HttpResponse};

use dragon_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::error::{handle_domain_error, request_language};

/// Handler for POST /dragon/code/verify
///
/// # Request Body
///
/// ```json
/// {
///     "key": "8613800000000",
///     "code": "123456"
/// }
/// ```
///
/// A correct code is consumed; a wrong one leaves it outstanding.
pub async fn verify_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<VerifyCodeRequest>,
) -> HttpResponse {
    let lang = request_language(&req);

    match state.verification.verify(&request.key, &request.code).await {
        Ok(verified) => HttpResponse::Ok().json(
            ApiResponse::success(VerifyCodeResponse::from(verified))
                .with_message(lang.localize("Verification succeeded", "验证成功")),
        ),
        Err(e) => handle_domain_error(&e, lang),
    }
}
