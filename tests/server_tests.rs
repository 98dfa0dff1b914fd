
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use judge_support::{StubJudge, approving, grader_with};
use kodcheck::{
    Verdict,
    constants::{CHECK_CODE_ROUTE, CORRECT_FEEDBACK, FALLBACK_FEEDBACK, NO_CODE_FEEDBACK},
    server::router,
};
use serde_json::json;
use tower::ServiceExt;

const ORIGIN: &str = "http://localhost:5173";

async fn post(app: Router, body: impl Into<Body>) -> (StatusCode, Verdict) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(CHECK_CODE_ROUTE)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn grades_a_correct_submission() {
    let app = router(grader_with(StubJudge::new(approving())), ORIGIN);
    let body = json!({
        "code": "yas = 10",
        "question": { "title": "Yaş", "description": "Şimdi dene: yas = 10 yaz" }
    });

    let (status, verdict) = post(app, body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(verdict.is_correct);
    assert_eq!(verdict.feedback, CORRECT_FEEDBACK);
}

#[tokio::test]
async fn response_uses_camel_case_keys() {
    let app = router(grader_with(StubJudge::new(approving())), ORIGIN);
    let body = json!({
        "code": "isim = Mehmet",
        "question": { "title": "İsim", "description": "isim = \"Mehmet\"" }
    });

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(CHECK_CODE_ROUTE)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["isCorrect"], json!(false));
    assert_eq!(value["lineComments"][0]["lineNumber"], json!(1));
    assert!(value["lineComments"][0]["content"].is_string());
}

#[tokio::test]
async fn missing_code_means_no_code_yet() {
    let judge = StubJudge::new(approving());
    let app = router(grader_with(judge.clone()), ORIGIN);

    let (status, verdict) = post(app, json!({ "question": { "title": "t" } }).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(verdict.feedback, NO_CODE_FEEDBACK);
    assert_eq!(judge.calls(), 0);
}

#[tokio::test]
async fn null_code_means_no_code_yet() {
    let judge = StubJudge::new(approving());
    let app = router(grader_with(judge.clone()), ORIGIN);

    let body = json!({ "code": null, "question": { "title": "t", "description": "x = 1" } });
    let (status, verdict) = post(app, body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!verdict.is_correct);
    assert_eq!(verdict.feedback, NO_CODE_FEEDBACK);
    assert_eq!(judge.calls(), 0);
}

#[tokio::test]
async fn malformed_body_still_gets_a_verdict() {
    let judge = StubJudge::new(approving());
    let app = router(grader_with(judge.clone()), ORIGIN);

    let (status, verdict) = post(app, "{ not json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!verdict.is_correct);
    assert_eq!(verdict.feedback, FALLBACK_FEEDBACK);
    assert!(verdict.line_comments.is_empty());
    assert_eq!(judge.calls(), 0);
}

#[tokio::test]
async fn preflight_allows_the_lesson_ui() {
    let app = router(grader_with(StubJudge::new(approving())), ORIGIN);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri(CHECK_CODE_ROUTE)
                .header(header::ORIGIN, ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(ORIGIN)
    );
}
