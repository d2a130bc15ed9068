use std::time::Duration;

use httpmock::{Method::GET, Method::POST, MockServer};
use serde_json::json;
use tribute_gateway::{
    AccessDecision, AuthMode, Credential, Endpoint, Gateway, GatewayConfig, GatewayError,
    LoginRequest, NewTribute, Outcome, RequestContext, RouteRequirement, Secret, SessionCookies,
    SessionLocals, Tainted, UpstreamRequest,
};

fn gateway_for(server: &MockServer) -> Gateway {
    let config = GatewayConfig::new(server.url("/wp-json"))
        .with_upstream_timeout(Duration::from_secs(2));
    Gateway::new(config).unwrap()
}

fn ctx_with_token(token: &str) -> RequestContext {
    let mut ctx = RequestContext::new("req-test");
    ctx.add_cookie("auth_token", token);
    ctx
}

#[tokio::test]
async fn anonymous_request_to_protected_route_redirects_without_upstream_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200).json_body(json!({}));
        })
        .await;
    let gateway = gateway_for(&server);

    let outcome = gateway
        .handle(
            &RequestContext::new("req-a"),
            &RouteRequirement::RequiresAuth,
            UpstreamRequest::get(Endpoint::AllTributes),
        )
        .await;

    assert_eq!(outcome, Outcome::Redirect("/login".to_string()));
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn tribute_by_slug_forwards_bearer_and_returns_record() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/wp-json/tributestream/v1/tribute/john-doe")
                .header("authorization", "Bearer abc");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"loved_one_name": "John Doe"}));
        })
        .await;
    let gateway = gateway_for(&server);
    let credential = gateway.resolve(&ctx_with_token("abc"));

    let envelope = gateway
        .tribute(&credential, Tainted::new("john-doe".to_string()))
        .await;

    assert!(envelope.is_ok());
    assert_eq!(envelope.status(), 200);
    assert_eq!(envelope.data(), Some(&json!({"loved_one_name": "John Doe"})));
    mock.assert_async().await;
}

#[tokio::test]
async fn tribute_fields_unknown_to_the_record_are_passed_through() {
    let server = MockServer::start_async().await;
    let body = json!({
        "loved_one_name": "John Doe",
        "livestream_url": "https://x",
        "service_date": "2024-01-01"
    });
    let upstream = body.clone();
    server
        .mock_async(move |when, then| {
            when.method(GET).path("/wp-json/tributestream/v1/tribute/john-doe");
            then.status(200).json_body(upstream);
        })
        .await;
    let gateway = gateway_for(&server);

    let envelope = gateway
        .tribute(&Credential::absent(), Tainted::new("john-doe".to_string()))
        .await;

    assert!(envelope.is_ok());
    assert_eq!(envelope.data(), Some(&body));
}

#[tokio::test]
async fn string_ids_from_wpdb_rows_are_accepted() {
    let server = MockServer::start_async().await;
    let body = json!([{"id": "3", "user_id": "7", "loved_one_name": "John Doe"}]);
    let upstream = body.clone();
    server
        .mock_async(move |when, then| {
            when.method(GET).path("/wp-json/tributestream/v1/all-tributes");
            then.status(200).json_body(upstream);
        })
        .await;
    let gateway = gateway_for(&server);

    let envelope = gateway.all_tributes(&Credential::absent()).await;

    assert!(envelope.is_ok());
    assert_eq!(envelope.status(), 200);
    assert_eq!(envelope.data(), Some(&body));
}

#[tokio::test]
async fn record_shape_mismatch_is_malformed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/wp-json/tributestream/v1/all-tributes");
            then.status(200).json_body(json!({"unexpected": true}));
        })
        .await;
    let gateway = gateway_for(&server);

    let envelope = gateway.all_tributes(&Credential::absent()).await;

    assert_eq!(envelope.status(), 500);
    assert_eq!(envelope.error(), Some("malformed response"));
}

#[tokio::test]
async fn upstream_404_becomes_failed_envelope_with_upstream_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/wp-json/tributestream/v1/all-tributes");
            then.status(404).body("Tributes not found");
        })
        .await;
    let gateway = gateway_for(&server);

    let envelope = gateway.all_tributes(&Credential::absent()).await;

    assert!(!envelope.is_ok());
    assert_eq!(envelope.status(), 404);
    assert_eq!(envelope.error(), Some("Tributes not found"));
    assert!(envelope.data().is_none());
}

#[tokio::test]
async fn wordpress_error_body_message_is_surfaced() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/wp-json/tributestream/v1/tribute/missing");
            then.status(404).json_body(json!({
                "code": "rest_no_route",
                "message": "No tribute with that slug",
                "data": {"status": 404}
            }));
        })
        .await;
    let gateway = gateway_for(&server);

    let envelope = gateway
        .tribute(&Credential::absent(), Tainted::new("missing".to_string()))
        .await;

    assert_eq!(envelope.status(), 404);
    assert_eq!(envelope.error(), Some("No tribute with that slug"));
}

#[test]
fn logout_clears_every_session_cookie() {
    let cookies = SessionCookies::new(vec!["auth_token".to_string(), "jwt".to_string()]);

    let (cleared, envelope) = cookies.logout();

    assert_eq!(cleared.len(), 2);
    assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));
    assert!(envelope.is_ok());
    assert_eq!(envelope.status(), 200);
    assert_eq!(envelope.data(), Some(&json!({"success": true})));
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/wp-json/tributestream/v1/all-tributes");
            then.status(200).body("not json");
        })
        .await;
    let gateway = gateway_for(&server);

    let envelope = gateway.all_tributes(&Credential::absent()).await;

    assert!(!envelope.is_ok());
    assert_eq!(envelope.status(), 500);
    assert_eq!(envelope.error(), Some("malformed response"));
}

#[tokio::test]
async fn slow_upstream_times_out_with_504() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200)
                .delay(Duration::from_millis(1500))
                .json_body(json!([]));
        })
        .await;
    let config = GatewayConfig::new(server.url("/wp-json"))
        .with_upstream_timeout(Duration::from_millis(200));
    let gateway = Gateway::new(config).unwrap();

    let envelope = gateway.all_tributes(&Credential::absent()).await;

    assert_eq!(envelope.status(), 504);
    assert_eq!(envelope.error(), Some("upstream timed out"));
}

#[tokio::test]
async fn unreachable_upstream_uses_network_failure_status() {
    let config = GatewayConfig::new("http://127.0.0.1:1/wp-json")
        .with_upstream_timeout(Duration::from_secs(2));
    let gateway = Gateway::new(config).unwrap();

    let envelope = gateway.all_tributes(&Credential::absent()).await;
    assert_eq!(envelope.status(), 500);
    assert!(!envelope.is_ok());

    let config = GatewayConfig::new("http://127.0.0.1:1/wp-json").with_network_failure_status(502);
    let gateway = Gateway::new(config).unwrap();
    let envelope = gateway.all_tributes(&Credential::absent()).await;
    assert_eq!(envelope.status(), 502);
}

#[tokio::test]
async fn required_auth_without_credential_never_reaches_upstream() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(201).json_body(json!({"id": 1}));
        })
        .await;
    let gateway = gateway_for(&server);
    let tribute = NewTribute {
        loved_one_name: "Jane Roe".to_string(),
        slug: Some("jane-roe".to_string()),
        user_id: None,
        custom_html: None,
        phone_number: None,
    };

    let envelope = gateway.create_tribute(&Credential::absent(), &tribute).await;

    assert_eq!(envelope.status(), 401);
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn create_tribute_posts_json_with_credential() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/wp-json/tributestream/v1/tribute")
                .header("authorization", "Bearer tok")
                .json_body(json!({"loved_one_name": "Jane Roe", "slug": "jane-roe"}));
            then.status(201)
                .json_body(json!({"id": 42, "message": "Tribute created"}));
        })
        .await;
    let gateway = gateway_for(&server);
    let tribute = NewTribute {
        loved_one_name: "Jane Roe".to_string(),
        slug: Some("jane-roe".to_string()),
        user_id: None,
        custom_html: None,
        phone_number: None,
    };

    let envelope = gateway
        .create_tribute(&Credential::bearer("tok"), &tribute)
        .await;

    assert_eq!(envelope.status(), 201);
    assert_eq!(envelope.data(), Some(&json!({"id": 42, "message": "Tribute created"})));
    mock.assert_async().await;
}

#[tokio::test]
async fn invalid_slug_is_rejected_before_upstream() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200).json_body(json!({"loved_one_name": "x"}));
        })
        .await;
    let gateway = gateway_for(&server);

    let envelope = gateway
        .tribute(&Credential::absent(), Tainted::new("../../wp-admin".to_string()))
        .await;

    assert_eq!(envelope.status(), 400);
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn repeated_gets_are_independent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/wp-json/tributestream/v1/all-tributes");
            then.status(200).json_body(json!([{"loved_one_name": "A"}]));
        })
        .await;
    let gateway = gateway_for(&server);

    let first = gateway.all_tributes(&Credential::absent()).await;
    let second = gateway.all_tributes(&Credential::absent()).await;

    assert_eq!(first, second);
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn login_returns_token_and_profile() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/wp-json/jwt-auth/v1/token")
                .json_body(json!({"username": "jane", "password": "hunter2"}));
            then.status(200).json_body(json!({
                "token": "jwt-value",
                "user_display_name": "Jane",
                "user_email": "jane@example.com",
                "user_nicename": "jane"
            }));
        })
        .await;
    let gateway = gateway_for(&server);

    let session = gateway
        .login(&LoginRequest::new("jane", "hunter2"))
        .await
        .unwrap();

    assert_eq!(session.token.expose_secret(), "jwt-value");
    assert_eq!(session.user.user_display_name, "Jane");
    mock.assert_async().await;
}

#[tokio::test]
async fn rejected_login_keeps_upstream_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/wp-json/jwt-auth/v1/token");
            then.status(403).json_body(json!({
                "code": "[jwt_auth] incorrect_password",
                "message": "Incorrect password",
                "data": {"status": 403}
            }));
        })
        .await;
    let gateway = gateway_for(&server);

    let err = gateway
        .login(&LoginRequest::new("jane", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 403);
    assert!(matches!(err, GatewayError::Upstream { .. }));
}

#[tokio::test]
async fn locals_token_takes_precedence_over_cookie() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/wp-json/jwt-auth/v1/token/validate")
                .header("authorization", "Bearer from-locals");
            then.status(200)
                .json_body(json!({"code": "jwt_auth_valid_token", "data": {"status": 200}}));
        })
        .await;
    let gateway = gateway_for(&server);
    let mut ctx = ctx_with_token("from-cookie");
    ctx.set_locals(SessionLocals {
        token: Some("from-locals".to_string()),
        ..SessionLocals::default()
    });

    let credential = gateway.resolve(&ctx);
    let envelope = gateway.validate_token(&credential).await;

    assert!(envelope.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn auth_mode_none_omits_credential() {
    let server = MockServer::start_async().await;
    let authed = server
        .mock_async(|when, then| {
            when.header_exists("authorization");
            then.status(418);
        })
        .await;
    let gateway = gateway_for(&server);

    let request = UpstreamRequest::get(Endpoint::AllTributes).with_auth(AuthMode::None);
    let _ = gateway.call(&Credential::bearer("secret"), &request).await;

    assert_eq!(authed.hits(), 0);
}

#[test]
fn role_mismatch_is_forbidden() {
    let gateway = Gateway::new(GatewayConfig::new("http://localhost/wp-json")).unwrap();
    let credential = Credential::bearer("tok").with_role("subscriber");

    let decision = gateway.authorize(&credential, &RouteRequirement::role("administrator"));
    assert_eq!(decision, AccessDecision::Reject(403));
}

#[test]
fn issued_cookie_never_appears_in_debug_output() {
    let cookies = SessionCookies::new(vec!["auth_token".to_string()]);
    let token = Secret::new("very-secret".to_string());

    let header = cookies.issue(&token).unwrap();
    assert!(header.starts_with("auth_token=very-secret;"));
    assert!(header.contains("HttpOnly"));
    assert!(!format!("{:?}", token).contains("very-secret"));
}
