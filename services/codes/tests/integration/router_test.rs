use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;
use tower::ServiceExt;

use rolegate_codes::authority::format::CodeFormat;

use crate::helpers::{
    TEST_ROLE, TEST_TOKEN, get, get_internal, json_body, post_internal, put_internal, t0, test_app,
};

#[tokio::test]
async fn should_issue_code_with_countdown() {
    let app = test_app(CodeFormat::default(), None);

    let resp = app.router.oneshot(get("/api/code")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let json = json_body(resp).await;
    let code = json["code"].as_str().unwrap();
    assert_eq!(code.len(), 11);
    assert_eq!(json["expiresIn"], 10_800);
    assert_eq!(
        json["expiresAt"],
        (t0() + Duration::hours(3)).timestamp_millis()
    );
    assert!(app.authority.code(code).is_some());
}

#[tokio::test]
async fn should_floor_expires_in_at_response_time() {
    let app = test_app(CodeFormat::default(), None);
    app.clock.advance(Duration::milliseconds(1_500));

    let resp = app.router.oneshot(get("/api/code")).await.unwrap();
    let json = json_body(resp).await;
    // cycle started at t0, 1.5s elapsed
    assert_eq!(json["expiresIn"], 10_798);
}

#[tokio::test]
async fn should_return_503_when_code_space_exhausted() {
    let format = CodeFormat::new("AB", 1, 1, '-').unwrap();
    let app = test_app(format, None);
    app.authority.generate_code().unwrap();
    app.authority.generate_code().unwrap();

    let resp = app.router.oneshot(get("/api/code")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(resp).await;
    assert_eq!(json["message"], "Service unavailable");
}

#[tokio::test]
async fn should_report_current_cycle() {
    let app = test_app(CodeFormat::default(), None);
    let cycle = app.authority.current_cycle();

    let resp = app.router.oneshot(get("/api/cycle")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["cycleId"], cycle.id.to_string());
    assert_eq!(json["expiresIn"], 10_800);
}

#[tokio::test]
async fn should_require_internal_token_for_verify() {
    let app = test_app(CodeFormat::default(), None);
    let body = json!({ "code": "ABC-DE2-FGH", "claimant": "1" });

    let missing = app
        .router
        .clone()
        .oneshot(post_internal("/api/verify", None, body.clone()))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .router
        .oneshot(post_internal("/api/verify", Some("nope"), body))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(wrong).await["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn should_verify_once_then_report_already_used() {
    let app = test_app(CodeFormat::default(), None);
    let code = app.authority.generate_code().unwrap();

    let first = app
        .router
        .clone()
        .oneshot(post_internal(
            "/api/verify",
            Some(TEST_TOKEN),
            json!({ "code": code.value.to_lowercase(), "claimant": "111" }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(json_body(first).await, json!({ "valid": true }));

    let second = app
        .router
        .oneshot(post_internal(
            "/api/verify",
            Some(TEST_TOKEN),
            json!({ "code": code.value, "claimant": "222" }),
        ))
        .await
        .unwrap();
    assert_eq!(
        json_body(second).await,
        json!({ "valid": false, "reason": "ALREADY_USED" })
    );
}

#[tokio::test]
async fn should_reject_never_issued_code() {
    let app = test_app(CodeFormat::default(), None);
    let resp = app
        .router
        .oneshot(post_internal(
            "/api/verify",
            Some(TEST_TOKEN),
            json!({ "code": "ZZZ-ZZZ-ZZZ", "claimant": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(
        json_body(resp).await,
        json!({ "valid": false, "reason": "INVALID_CODE" })
    );
}

#[tokio::test]
async fn should_reject_wrong_length_as_bad_request() {
    let app = test_app(CodeFormat::default(), None);
    let resp = app
        .router
        .oneshot(post_internal(
            "/api/verify",
            Some(TEST_TOKEN),
            json!({ "code": "ABC", "claimant": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["kind"], "INVALID_INPUT");
    assert_eq!(json["message"], "code must be 11 characters");
}

#[tokio::test]
async fn should_report_expired_just_after_cycle_end() {
    let app = test_app(CodeFormat::default(), None);
    let code = app.authority.generate_code().unwrap();
    app.clock.set(code.expires_at + Duration::milliseconds(1));

    let resp = app
        .router
        .oneshot(post_internal(
            "/api/verify",
            Some(TEST_TOKEN),
            json!({ "code": code.value, "claimant": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(
        json_body(resp).await,
        json!({ "valid": false, "reason": "EXPIRED" })
    );
}

#[tokio::test]
async fn refresh_invalidates_outstanding_codes() {
    let app = test_app(CodeFormat::default(), None);
    let code = app.authority.generate_code().unwrap();
    let before = app.authority.current_cycle();

    let unauthorized = app
        .router
        .clone()
        .oneshot(post_internal("/internal/cycle/refresh", None, json!({})))
        .await
        .unwrap();
    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.authority.current_cycle(), before);

    let refreshed = app
        .router
        .clone()
        .oneshot(post_internal("/internal/cycle/refresh", Some(TEST_TOKEN), json!({})))
        .await
        .unwrap();
    assert_eq!(refreshed.status(), StatusCode::OK);
    let json = json_body(refreshed).await;
    assert_ne!(json["cycleId"], before.id.to_string());

    let resp = app
        .router
        .oneshot(post_internal(
            "/api/verify",
            Some(TEST_TOKEN),
            json!({ "code": code.value, "claimant": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(
        json_body(resp).await,
        json!({ "valid": false, "reason": "INVALID_CODE" })
    );
}

#[tokio::test]
async fn claim_grants_configured_role() {
    let app = test_app(CodeFormat::default(), Some(TEST_ROLE));
    let code = app.authority.generate_code().unwrap();

    let resp = app
        .router
        .clone()
        .oneshot(post_internal(
            "/api/claims",
            Some(TEST_TOKEN),
            json!({ "code": code.value, "claimant": "42" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["status"], "granted");
    assert_eq!(json["roleId"], TEST_ROLE);
    assert_eq!(json["revokeAt"], (t0() + Duration::hours(3)).timestamp_millis());

    let again = app
        .router
        .oneshot(post_internal(
            "/api/claims",
            Some(TEST_TOKEN),
            json!({ "code": code.value, "claimant": "43" }),
        ))
        .await
        .unwrap();
    assert_eq!(
        json_body(again).await,
        json!({ "status": "rejected", "reason": "ALREADY_USED" })
    );
}

#[tokio::test]
async fn claim_without_role_reports_it() {
    let app = test_app(CodeFormat::default(), None);
    let code = app.authority.generate_code().unwrap();

    let resp = app
        .router
        .oneshot(post_internal(
            "/api/claims",
            Some(TEST_TOKEN),
            json!({ "code": code.value, "claimant": "42" }),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(resp).await, json!({ "status": "no_role_configured" }));
}

#[tokio::test]
async fn health_endpoints_and_fallback() {
    let app = test_app(CodeFormat::default(), None);

    let healthz = app.router.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(healthz.status(), StatusCode::OK);

    let readyz = app.router.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(readyz.status(), StatusCode::OK);

    let missing = app.router.oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(missing).await["kind"], "NOT_FOUND");
}

#[tokio::test]
async fn readyz_fails_once_shutdown_begins() {
    let app = test_app(CodeFormat::default(), None);
    app.shutdown.cancel();

    let readyz = app.router.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(readyz.status(), StatusCode::SERVICE_UNAVAILABLE);

    // still serving while draining
    let healthz = app.router.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(healthz.status(), StatusCode::OK);
}

#[tokio::test]
async fn lowercase_alphabet_codes_verify_as_issued() {
    let format = CodeFormat::new("abcdefghjkmnpqrstuvwxyz23456789", 9, 3, '-').unwrap();
    let app = test_app(format, None);

    let issued = app.router.clone().oneshot(get("/api/code")).await.unwrap();
    let code = json_body(issued).await["code"].as_str().unwrap().to_owned();
    assert_eq!(code, code.to_lowercase());

    let resp = app
        .router
        .clone()
        .oneshot(post_internal(
            "/api/verify",
            Some(TEST_TOKEN),
            json!({ "code": code, "claimant": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "valid": true }));

    let shouted = app
        .router
        .oneshot(post_internal(
            "/api/verify",
            Some(TEST_TOKEN),
            json!({ "code": code.to_uppercase(), "claimant": "2" }),
        ))
        .await
        .unwrap();
    assert_eq!(
        json_body(shouted).await,
        json!({ "valid": false, "reason": "ALREADY_USED" })
    );
}

#[tokio::test]
async fn custom_separator_codes_pass_length_check() {
    let format = CodeFormat::new("ABCDEFGH", 8, 4, '.').unwrap();
    let app = test_app(format, None);
    let code = app.authority.generate_code().unwrap();

    let resp = app
        .router
        .oneshot(post_internal(
            "/api/verify",
            Some(TEST_TOKEN),
            json!({ "code": code.value, "claimant": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "valid": true }));
}

#[tokio::test]
async fn staff_can_set_target_role_at_runtime() {
    let app = test_app(CodeFormat::default(), None);

    let unauthorized = app
        .router
        .clone()
        .oneshot(put_internal("/internal/target-role", None, json!({ "roleId": TEST_ROLE })))
        .await
        .unwrap();
    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

    let set = app
        .router
        .clone()
        .oneshot(put_internal(
            "/internal/target-role",
            Some(TEST_TOKEN),
            json!({ "roleId": TEST_ROLE }),
        ))
        .await
        .unwrap();
    assert_eq!(set.status(), StatusCode::OK);
    assert_eq!(json_body(set).await, json!({ "roleId": TEST_ROLE }));

    let current = app
        .router
        .clone()
        .oneshot(get_internal("/internal/target-role", Some(TEST_TOKEN)))
        .await
        .unwrap();
    assert_eq!(json_body(current).await, json!({ "roleId": TEST_ROLE }));

    let code = app.authority.generate_code().unwrap();
    let claim = app
        .router
        .clone()
        .oneshot(post_internal(
            "/api/claims",
            Some(TEST_TOKEN),
            json!({ "code": code.value, "claimant": "42" }),
        ))
        .await
        .unwrap();
    let json = json_body(claim).await;
    assert_eq!(json["status"], "granted");
    assert_eq!(json["roleId"], TEST_ROLE);

    let cleared = app
        .router
        .oneshot(put_internal(
            "/internal/target-role",
            Some(TEST_TOKEN),
            json!({ "roleId": null }),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(cleared).await, json!({ "roleId": null }));
}
