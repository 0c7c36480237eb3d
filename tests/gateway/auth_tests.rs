use actix_web::{App, http::StatusCode, test};
use skipper::config::{AuthConfig, BearerAuthConfig, GatewayConfig};
use skipper::gateway::http::auth::Authentication;
use skipper::gateway::http::handlers;
use std::sync::Arc;

fn gateway_config(token: Option<&str>) -> Arc<GatewayConfig> {
    Arc::new(GatewayConfig {
        authenticate: token.map(|t| AuthConfig {
            bearer: Some(BearerAuthConfig {
                token: t.to_string(),
            }),
        }),
        ..GatewayConfig::default()
    })
}

async fn status_of(config: Arc<GatewayConfig>, req: test::TestRequest) -> StatusCode {
    let app = test::init_service(
        App::new()
            .wrap(Authentication::new(config))
            .configure(handlers::configure),
    )
    .await;

    match test::try_call_service(&app, req.to_request()).await {
        Ok(resp) => resp.status(),
        Err(e) => e.as_response_error().status_code(),
    }
}

#[actix_web::test]
async fn test_missing_token_is_rejected() {
    let status = status_of(
        gateway_config(Some("s3cret")),
        test::TestRequest::get().uri("/commands"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_wrong_token_is_rejected() {
    let status = status_of(
        gateway_config(Some("s3cret")),
        test::TestRequest::get()
            .uri("/commands")
            .insert_header(("Authorization", "Bearer nope")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_valid_token_is_accepted() {
    let status = status_of(
        gateway_config(Some("s3cret")),
        test::TestRequest::get()
            .uri("/commands")
            .insert_header(("Authorization", "Bearer s3cret")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_health_is_exempt() {
    let status = status_of(
        gateway_config(Some("s3cret")),
        test::TestRequest::get().uri("/health"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_no_authentication_configured() {
    let status = status_of(gateway_config(None), test::TestRequest::get().uri("/commands")).await;
    assert_eq!(status, StatusCode::OK);
}
