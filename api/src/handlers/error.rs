//! Mapping of domain errors to HTTP responses
//!
//! Every failure body is an [`ErrorResponse`] whose `error` field is a stable
//! code and whose `message` is localized from the request's
//! `Accept-Language` header.

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse};
use validator::ValidationErrors;

use dragon_core::errors::{DomainError, VerificationError};
use dragon_shared::{error_codes, ErrorResponse, Language};

/// Detect language preference from the Accept-Language header
pub fn request_language(req: &HttpRequest) -> Language {
    req.headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(Language::from_accept_language)
        .unwrap_or_default()
}

/// Status, error code and localized message for a verification failure
fn verification_error_parts(error: &VerificationError, lang: Language) -> (StatusCode, &'static str, &'static str) {
    match error {
        VerificationError::InvalidCountry => (
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_COUNTRY,
            lang.localize(
                "Mobile numbers from this country or region are not supported",
                "不支持该国家或地区的手机号码",
            ),
        ),
        VerificationError::InvalidKeyFormat => (
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_KEY_FORMAT,
            lang.localize("Invalid mobile number format", "手机号码格式不正确"),
        ),
        VerificationError::EmptySubmission => (
            StatusCode::BAD_REQUEST,
            error_codes::EMPTY_SUBMISSION,
            lang.localize("Please enter the verification code", "请输入验证码"),
        ),
        VerificationError::Mismatch => (
            StatusCode::BAD_REQUEST,
            error_codes::CODE_MISMATCH,
            lang.localize("Incorrect verification code", "验证码不正确"),
        ),
        VerificationError::NoSuchChallenge => (
            StatusCode::NOT_FOUND,
            error_codes::NO_SUCH_CHALLENGE,
            lang.localize(
                "Verification code not found, please request a new one",
                "验证码不存在，请重新获取",
            ),
        ),
        VerificationError::Expired => (
            StatusCode::GONE,
            error_codes::CODE_EXPIRED,
            lang.localize(
                "Verification code has expired, please request a new one",
                "验证码已过期，请重新获取",
            ),
        ),
        VerificationError::DeliveryFailed { .. } => (
            StatusCode::BAD_GATEWAY,
            error_codes::DELIVERY_FAILED,
            lang.localize(
                "Failed to send the verification code, please try again later",
                "验证码发送失败，请稍后重试",
            ),
        ),
    }
}

/// Convert a domain error into a localized HTTP response
pub fn handle_domain_error(error: &DomainError, lang: Language) -> HttpResponse {
    match error {
        DomainError::Verification(verification) => {
            let (status, code, message) = verification_error_parts(verification, lang);
            let mut body = ErrorResponse::new(code, message);
            if let VerificationError::DeliveryFailed { key, .. } = verification {
                body = body.add_detail("challenge_key", key);
            }
            HttpResponse::build(status).json(body)
        }
        DomainError::Validation { message } => {
            HttpResponse::BadRequest().json(ErrorResponse::new(error_codes::VALIDATION_ERROR, message.as_str()))
        }
        DomainError::Internal { message } => {
            tracing::error!(error = %message, "Internal error while handling verification request");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                error_codes::INTERNAL_ERROR,
                lang.localize("Internal server error", "服务器内部错误"),
            ))
        }
    }
}

/// 400 response listing the fields that failed validation
pub fn validation_error_response(errors: &ValidationErrors, lang: Language) -> HttpResponse {
    let mut body = ErrorResponse::new(
        error_codes::VALIDATION_ERROR,
        lang.localize("Invalid request parameters", "请求参数无效"),
    );
    for (field, field_errors) in errors.field_errors() {
        let codes: Vec<String> = field_errors.iter().map(|e| e.code.to_string()).collect();
        body = body.add_detail(field, codes);
    }
    HttpResponse::BadRequest().json(body)
}

fn malformed_request(detail: String, req: &HttpRequest) -> HttpResponse {
    let lang = request_language(req);
    HttpResponse::BadRequest().json(
        ErrorResponse::new(
            error_codes::VALIDATION_ERROR,
            lang.localize("Malformed request", "请求格式错误"),
        )
        .add_detail("reason", detail),
    )
}

/// Error handler for `web::Json` extraction failures
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let response = malformed_request(err.to_string(), req);
    InternalError::from_response(err, response).into()
}

/// Error handler for `web::Query` extraction failures
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let response = malformed_request(err.to_string(), req);
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_request_language() {
        let req = TestRequest::default()
            .insert_header((header::ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.8"))
            .to_http_request();
        assert_eq!(request_language(&req), Language::Chinese);

        let req = TestRequest::default().to_http_request();
        assert_eq!(request_language(&req), Language::English);
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (VerificationError::InvalidCountry, StatusCode::BAD_REQUEST),
            (VerificationError::InvalidKeyFormat, StatusCode::BAD_REQUEST),
            (VerificationError::EmptySubmission, StatusCode::BAD_REQUEST),
            (VerificationError::Mismatch, StatusCode::BAD_REQUEST),
            (VerificationError::NoSuchChallenge, StatusCode::NOT_FOUND),
            (VerificationError::Expired, StatusCode::GONE),
            (
                VerificationError::DeliveryFailed {
                    key: "861****0000".to_string(),
                    reason: "gateway down".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, status) in cases {
            let response = handle_domain_error(&DomainError::from(error), Language::English);
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_internal_and_validation_errors() {
        let internal = DomainError::Internal {
            message: "store unavailable".to_string(),
        };
        assert_eq!(
            handle_domain_error(&internal, Language::English).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let validation = DomainError::Validation {
            message: "bad".to_string(),
        };
        assert_eq!(
            handle_domain_error(&validation, Language::Chinese).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages_are_localized() {
        let (_, code, en) = verification_error_parts(&VerificationError::Expired, Language::English);
        let (_, _, zh) = verification_error_parts(&VerificationError::Expired, Language::Chinese);
        assert_eq!(code, error_codes::CODE_EXPIRED);
        assert!(en.contains("expired"));
        assert!(zh.contains("过期"));
    }
}
