//! HTTP request handlers for the gateway.
//!
//! - `POST /interactions` runs a command and streams its replies as SSE
//! - `GET /commands` lists the command definitions
//! - `GET /health` reports liveness

use crate::gateway::commands::{Command, command_definitions};
use crate::gateway::dispatcher::Dispatcher;
use crate::gateway::http::actix_error::ApiError;
use crate::gateway::http::events::{SseInteraction, format_sse_message};
use crate::gateway::http::types::InteractionRequest;

use actix_web::{
    HttpResponse, Responder,
    web::{self, Data},
};
use serde_json::json;
use std::sync::Arc;

/// Header carrying the interaction id
pub const INTERACTION_ID_HEADER: &str = "X-Interaction-Id";

/// Run a command and stream its responses.
///
/// The response body is a `text/event-stream` that closes once the handler
/// has finished with the interaction.
pub async fn interactions(
    dispatcher: Data<Arc<Dispatcher>>,
    body: web::Json<InteractionRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let command: Command = request
        .command
        .parse()
        .map_err(|_| ApiError::InvalidRequest(format!("Unknown command: {}", request.command)))?;

    let (interaction, mut receiver) = SseInteraction::new(request.channel_id);
    let interaction_id = interaction.id();

    tracing::info!(
        interaction_id = %interaction_id,
        command = %command,
        channel_id = %request.channel_id,
        "Interaction received"
    );

    if !dispatcher.on_command(command, Arc::new(interaction)) {
        return Err(ApiError::ShuttingDown);
    }

    let stream = async_stream::stream! {
        while let Some(message) = receiver.recv().await {
            yield Ok::<_, actix_web::Error>(format_sse_message(&message));
        }
        tracing::debug!(interaction_id = %interaction_id, "Interaction stream closed");
    };

    Ok(HttpResponse::Ok()
        .append_header(("Content-Type", "text/event-stream"))
        .append_header(("Cache-Control", "no-cache"))
        .append_header((INTERACTION_ID_HEADER, interaction_id.to_string()))
        .streaming(stream))
}

/// List the registered command definitions
pub async fn list_commands() -> impl Responder {
    web::Json(command_definitions())
}

/// Liveness probe
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Register the gateway routes on an Actix app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/interactions", web::post().to(interactions))
        .route("/commands", web::get().to(list_commands))
        .route("/health", web::get().to(health));
}
