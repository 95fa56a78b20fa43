//! HTTP tests for the verification code routes

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    use dragon_api::{create_app, AppState, DynVerificationService};
    use dragon_core::domain::ChallengeKey;
    use dragon_core::services::verification::{
        CodeStore, ImageRenderer, ManualClock, SmsSender, VerificationService,
        VerificationServiceConfig,
    };
    use dragon_infra::image::SvgRendererConfig;
    use dragon_infra::{InMemoryCodeStore, MockSmsSender, SvgImageRenderer};
    use dragon_shared::Environment;

    const MOBILE: &str = "8613800000000";

    struct Harness {
        state: web::Data<AppState>,
        store: Arc<InMemoryCodeStore>,
        clock: Arc<ManualClock>,
    }

    impl Harness {
        fn new(sms: MockSmsSender) -> Self {
            let store = Arc::new(InMemoryCodeStore::new());
            let clock = Arc::new(ManualClock::new(Utc::now()));
            let code_store: Arc<dyn CodeStore> = store.clone();
            let sms_sender: Arc<dyn SmsSender> = Arc::new(sms);
            let renderer: Arc<dyn ImageRenderer> =
                Arc::new(SvgImageRenderer::new(SvgRendererConfig::default()));
            let service: DynVerificationService = VerificationService::new(
                code_store,
                sms_sender,
                renderer,
                VerificationServiceConfig::default(),
            )
            .unwrap()
            .with_clock(clock.clone());

            Self {
                state: web::Data::new(AppState::new(Arc::new(service))),
                store,
                clock,
            }
        }

        async fn stored_value(&self, key: &str) -> Option<String> {
            let key = ChallengeKey::parse(key).unwrap();
            self.store.get(&key).await.unwrap().map(|code| code.value)
        }
    }

    fn verify_request(key: &str, code: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/dragon/code/verify")
            .set_json(json!({ "key": key, "code": code }))
    }

    #[actix_web::test]
    async fn test_sms_code_send_and_verify() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/dragon/code/sms?mobile={}", MOBILE))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["key"], MOBILE);
        let expires_in = body["data"]["expires_in"].as_i64().unwrap();
        assert!((118..=120).contains(&expires_in));

        let code = harness.stored_value(MOBILE).await.unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let resp = test::call_service(&app, verify_request(MOBILE, &code).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["kind"], "sms");

        // Codes are single use
        let resp = test::call_service(&app, verify_request(MOBILE, &code).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "NO_SUCH_CHALLENGE");
    }

    #[actix_web::test]
    async fn test_sms_unsupported_country_in_chinese() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get()
            .uri("/dragon/code/sms?mobile=1234")
            .insert_header((header::ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "INVALID_COUNTRY");
        assert_eq!(body["message"], "不支持该国家或地区的手机号码");
        assert!(harness.store.is_empty());
    }

    #[actix_web::test]
    async fn test_sms_wrong_length_is_invalid_format() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get()
            .uri("/dragon/code/sms?mobile=86138")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "INVALID_KEY_FORMAT");
    }

    #[actix_web::test]
    async fn test_sms_delivery_failure_keeps_code() {
        let harness = Harness::new(MockSmsSender::failing());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/dragon/code/sms?mobile={}", MOBILE))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "DELIVERY_FAILED");
        assert!(body["details"]["challenge_key"].is_string());

        let code = harness.stored_value(MOBILE).await.unwrap();
        let resp = test::call_service(&app, verify_request(MOBILE, &code).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_image_code_raw_response() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get().uri("/dragon/code/image").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/svg+xml");
        assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");

        let key = resp
            .headers()
            .get("x-challenge-key")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(key.starts_with("image:"));

        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().starts_with("<svg"));

        let code = harness.stored_value(&key).await.unwrap();
        let resp = test::call_service(&app, verify_request(&key, &code).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["kind"], "image");
    }

    #[actix_web::test]
    async fn test_image_code_json_response() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get()
            .uri("/dragon/code/image?format=json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let data = &body["data"];
        assert_eq!(data["content_type"], "image/svg+xml");
        assert!(data["image"]
            .as_str()
            .unwrap()
            .starts_with("data:image/svg+xml;base64,"));

        let key = data["key"].as_str().unwrap();
        assert!(harness.stored_value(key).await.is_some());
    }

    #[actix_web::test]
    async fn test_each_image_request_gets_its_own_key() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let mut keys = Vec::new();
        for _ in 0..2 {
            let req = test::TestRequest::get().uri("/dragon/code/image").to_request();
            let resp = test::call_service(&app, req).await;
            keys.push(resp.headers().get("x-challenge-key").unwrap().clone());
        }
        assert_ne!(keys[0], keys[1]);
        assert_eq!(harness.store.len(), 2);
    }

    #[actix_web::test]
    async fn test_mismatch_keeps_code_outstanding() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/dragon/code/sms?mobile={}", MOBILE))
            .to_request();
        test::call_service(&app, req).await;
        let code = harness.stored_value(MOBILE).await.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let resp = test::call_service(&app, verify_request(MOBILE, wrong).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "CODE_MISMATCH");

        let resp = test::call_service(&app, verify_request(MOBILE, &code).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_over_long_submission_is_a_verification_outcome() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/dragon/code/sms?mobile={}", MOBILE))
            .to_request();
        test::call_service(&app, req).await;
        let code = harness.stored_value(MOBILE).await.unwrap();

        let long_code = "9".repeat(65);
        let resp = test::call_service(&app, verify_request(MOBILE, &long_code).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "CODE_MISMATCH");

        let long_key = "8".repeat(129);
        let resp = test::call_service(&app, verify_request(&long_key, "123456").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(&app, verify_request(MOBILE, &code).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_empty_submission() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let resp = test::call_service(&app, verify_request(MOBILE, "   ").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "EMPTY_SUBMISSION");
    }

    #[actix_web::test]
    async fn test_expired_code_returns_gone() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/dragon/code/sms?mobile={}", MOBILE))
            .to_request();
        test::call_service(&app, req).await;
        let code = harness.stored_value(MOBILE).await.unwrap();

        harness.clock.advance(Duration::seconds(120));

        let resp = test::call_service(&app, verify_request(MOBILE, &code).to_request()).await;
        assert_eq!(resp.status(), StatusCode::GONE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "CODE_EXPIRED");

        let resp = test::call_service(&app, verify_request(MOBILE, &code).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_malformed_json_body() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::post()
            .uri("/dragon/code/verify")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_missing_mobile_parameter() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get().uri("/dragon/code/sms").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_health_and_not_found() {
        let harness = Harness::new(MockSmsSender::new());
        let app = test::init_service(create_app(harness.state.clone(), Environment::Development)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["code_store"]["status"], "healthy");

        let req = test::TestRequest::get().uri("/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "NOT_FOUND");
    }
}
