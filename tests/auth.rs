use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use chime_backend::api;
use chime_backend::services::database::Database;

macro_rules! app_without_pool {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Database::default()))
                .configure(api::config),
        )
        .await
    };
}

#[actix_web::test]
async fn signup_rejects_invalid_fields_with_400_envelope() {
    let app = app_without_pool!();

    let req = test::TestRequest::post()
        .uri("/api/v1/signup")
        .set_json(json!({ "email": "not-an-email", "username": "bad name", "password": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "FAILURE");
    assert_eq!(body["code"], 400);

    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid input: "));
    assert!(message.contains("Invalid email address"));
    assert!(message.contains("Only letters, numbers, _ and - allowed"));
    assert!(message.contains("Password must be at least 8 characters"));
}

#[actix_web::test]
async fn valid_signup_needs_a_database() {
    let app = app_without_pool!();

    let req = test::TestRequest::post()
        .uri("/api/v1/signup")
        .set_json(json!({ "email": "ada@example.com", "username": "ada", "password": "hunter22" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn login_rejects_short_password_with_400() {
    let app = app_without_pool!();

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": "ada", "password": "1234" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Invalid input: Must be at least 8 characters");
}

#[actix_web::test]
async fn valid_login_needs_a_database() {
    let app = app_without_pool!();

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": "ada", "password": "hunter22" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
