use actix_web::{App, http::StatusCode, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use skipper::config::{ServerMapping, Snowflake};
use skipper::error::{Error, Result};
use skipper::gateway::http::handlers::{self, INTERACTION_ID_HEADER};
use skipper::gateway::{CommandDefinition, CommandHandler, Dispatcher};
use skipper::lifecycle::ServerLifecycleController;
use skipper::registry::ServerRegistry;
use skipper::runtime::{ContainerObservation, ContainerRuntime, LogBundle};
use std::sync::Arc;
use std::time::Duration;

/// Runtime reporting a single stopped container
struct StoppedRuntime;

#[async_trait]
impl ContainerRuntime for StoppedRuntime {
    async fn inspect(&self, container: &str) -> Result<ContainerObservation> {
        Ok(ContainerObservation::new(container, false))
    }

    async fn stop(&self, container: &str, _grace: Duration) -> Result<()> {
        Err(Error::Runtime(format!("unexpected stop of {}", container)))
    }

    async fn kill(&self, container: &str, _signal: &str) -> Result<()> {
        Err(Error::Runtime(format!("unexpected kill of {}", container)))
    }

    async fn start(&self, container: &str) -> Result<()> {
        Err(Error::Runtime(format!("unexpected start of {}", container)))
    }

    async fn fetch_logs(&self, _container: &str) -> Result<LogBundle> {
        Ok(LogBundle::default())
    }
}

fn dispatcher() -> Arc<Dispatcher> {
    let registry = ServerRegistry::new(vec![ServerMapping {
        name: "Valheim".to_string(),
        container: "valheim".to_string(),
        channel_id: Snowflake::new(42),
    }]);
    let controller = ServerLifecycleController::new(Arc::new(registry), Arc::new(StoppedRuntime));
    Arc::new(Dispatcher::new(Arc::new(CommandHandler::new(Arc::new(
        controller,
    )))))
}

/// Split an SSE body into (event, data) pairs
fn events(body: &[u8]) -> Vec<(String, Value)> {
    let text = std::str::from_utf8(body).unwrap();
    text.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let mut event = String::new();
            let mut data = Value::Null;
            for line in block.lines() {
                if let Some(e) = line.strip_prefix("event: ") {
                    event = e.to_string();
                } else if let Some(d) = line.strip_prefix("data: ") {
                    data = serde_json::from_str(d).unwrap();
                }
            }
            (event, data)
        })
        .collect()
}

#[actix_web::test]
async fn test_status_interaction_streams_events() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(dispatcher()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/interactions")
        .set_json(json!({ "command": "/server status", "channelId": "42" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key(INTERACTION_ID_HEADER));
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "text/event-stream"
    );

    let body = test::read_body(resp).await;
    let events = events(&body);
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].0, "respond");
    assert_eq!(events[0].1["content"], "Getting server status...");

    assert_eq!(events[1].0, "edit");
    assert_eq!(events[1].1["panel"]["author"], "Valheim");
    assert_eq!(events[1].1["panel"]["status"], "Offline");
}

#[actix_web::test]
async fn test_unbound_channel_interaction() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(dispatcher()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/interactions")
        .set_json(json!({ "command": "server logs", "channelId": 7 }))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;

    let events = events(&body);
    assert_eq!(
        events.last().unwrap().1["content"],
        "No server is assigned to this channel."
    );
}

#[actix_web::test]
async fn test_unknown_command_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(dispatcher()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/interactions")
        .set_json(json!({ "command": "server deploy", "channelId": "42" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 400);
}

#[actix_web::test]
async fn test_shut_down_dispatcher_rejects_interactions() {
    let dispatcher = dispatcher();
    dispatcher.shutdown().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(dispatcher))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/interactions")
        .set_json(json!({ "command": "server status", "channelId": "42" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_list_commands() {
    let app = test::init_service(App::new().configure(handlers::configure)).await;

    let req = test::TestRequest::get().uri("/commands").to_request();
    let definitions: Vec<CommandDefinition> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].name, "server");
    assert_eq!(definitions[0].options.len(), 3);
}

#[actix_web::test]
async fn test_health() {
    let app = test::init_service(App::new().configure(handlers::configure)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}
