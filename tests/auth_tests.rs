use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use payroll_admin::auth::handlers::{LoginResponse, VerifyResponse};

#[macro_use]
mod common;

use common::{ADMIN_PASSWORD, TestContext, bearer, get, post};

#[actix_web::test]
async fn login_verify_logout_round() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = post("/auth/login")
        .set_json(json!({ "username": "admin", "password": ADMIN_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let login: LoginResponse = test::read_body_json(resp).await;
    assert!(login.success);
    assert_eq!(login.user.username, "admin");

    let req = get("/auth/verify")
        .insert_header(bearer(&login.token))
        .to_request();
    let verified: VerifyResponse = test::call_and_read_body_json(&app, req).await;
    assert!(verified.valid);
    assert_eq!(verified.user.full_name, "Test admin");

    // the session opens the protected API
    let req = get("/api/employees")
        .insert_header(bearer(&login.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = post("/auth/logout")
        .insert_header(bearer(&login.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = get("/auth/verify")
        .insert_header(bearer(&login.token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = get("/api/employees")
        .insert_header(bearer(&login.token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn wrong_credentials_are_rejected() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    for (username, password) in [("admin", "wrong"), ("nobody", ADMIN_PASSWORD), ("hr", "")] {
        let req = post("/auth/login")
            .set_json(json!({ "username": username, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_ne!(resp.status(), StatusCode::OK, "{username}");

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}

#[actix_web::test]
async fn empty_credentials_are_a_bad_request() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = post("/auth/login")
        .set_json(json!({ "username": "  ", "password": "x" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn verify_without_token_is_unauthorized() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = get("/auth/verify").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // logout is accepted even without a session
    let req = post("/auth/logout").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
