use crate::error::{Error, Result};
use crate::gateway::Interaction;
use crate::gateway::reply::{Attachment, Reply, StatusPanel};
use crate::lifecycle::{
    LogsReport, RestartMilestone, RestartProgress, ServerLifecycleController, StatusReport,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Name of the command group all commands live under.
pub const COMMAND_GROUP: &str = "server";

/// Reply for channels without a managed server.
pub const NO_SERVER_MESSAGE: &str = "No server is assigned to this channel.";

/// Reply when neither log stream has content.
pub const NO_LOGS_MESSAGE: &str = "No logs available.";

/// Commands understood by the gateway.
///
/// # Examples
///
/// ```
/// use skipper::gateway::Command;
///
/// assert_eq!("server restart".parse::<Command>().unwrap(), Command::Restart);
/// assert_eq!("/server logs".parse::<Command>().unwrap(), Command::Logs);
/// assert_eq!("status".parse::<Command>().unwrap(), Command::Status);
/// assert!("server deploy".parse::<Command>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `server status`
    Status,
    /// `server logs`
    Logs,
    /// `server restart`
    Restart,
}

impl Command {
    /// Subcommand name
    pub fn name(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Logs => "logs",
            Self::Restart => "restart",
        }
    }

    /// Description registered with the chat platform
    pub fn description(self) -> &'static str {
        match self {
            Self::Status => "Current server status",
            Self::Logs => "Server logs",
            Self::Restart => "Restart the server",
        }
    }

    /// All commands in registration order
    pub fn all() -> [Command; 3] {
        [Self::Status, Self::Logs, Self::Restart]
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", COMMAND_GROUP, self.name())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('/');
        let name = match trimmed.split_once(char::is_whitespace) {
            Some((group, rest)) if group == COMMAND_GROUP => rest.trim(),
            Some(_) => return Err(Error::Gateway(format!("Unknown command: {}", s))),
            None => trimmed,
        };

        Self::all()
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::Gateway(format!("Unknown command: {}", s)))
    }
}

/// Application command type for a top-level slash command.
const CHAT_INPUT: u8 = 1;

/// Option type for a subcommand.
const SUB_COMMAND: u8 = 1;

/// A command (or subcommand option) as registered with the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Command name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Platform type discriminator
    #[serde(rename = "type")]
    pub kind: u8,
    /// Nested subcommands
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandDefinition>,
}

/// Definitions of the `server` command group.
pub fn command_definitions() -> Vec<CommandDefinition> {
    let options = Command::all()
        .into_iter()
        .map(|c| CommandDefinition {
            name: c.name().to_string(),
            description: c.description().to_string(),
            kind: SUB_COMMAND,
            options: Vec::new(),
        })
        .collect();

    vec![CommandDefinition {
        name: COMMAND_GROUP.to_string(),
        description: "Server management".to_string(),
        kind: CHAT_INPUT,
        options,
    }]
}

/// Render the outcome of a status query.
pub fn render_status(report: &StatusReport) -> Reply {
    Reply::panel(StatusPanel::new(&report.name, report.online))
}

/// Render the outcome of a log query.
///
/// Only non-empty streams are attached.
pub fn render_logs(report: &LogsReport) -> Reply {
    if report.logs.is_empty() {
        return Reply::text(NO_LOGS_MESSAGE);
    }

    let mut attachments = Vec::new();
    if let Some(stdout) = report.logs.stdout() {
        attachments.push(Attachment::new("stdout.txt", stdout));
    }
    if let Some(stderr) = report.logs.stderr() {
        attachments.push(Attachment::new("stderr.txt", stderr));
    }

    Reply::attachments(attachments)
}

/// Forwards restart milestones as edits of the original response.
struct EditProgress<'a> {
    interaction: &'a dyn Interaction,
}

#[async_trait]
impl RestartProgress for EditProgress<'_> {
    async fn report(&self, milestone: RestartMilestone) {
        if let Err(e) = self
            .interaction
            .edit_response(Reply::text(milestone.message()))
            .await
        {
            warn!(milestone = ?milestone, error = %e, "Failed to deliver restart progress");
        }
    }
}

/// Executes commands against the lifecycle controller and renders the
/// results through an [`Interaction`].
pub struct CommandHandler {
    controller: Arc<ServerLifecycleController>,
}

impl CommandHandler {
    /// Create a handler for `controller`
    pub fn new(controller: Arc<ServerLifecycleController>) -> Self {
        Self { controller }
    }

    /// Run `command` for `interaction`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the initial response or the final edit
    /// cannot be delivered.
    pub async fn handle(&self, command: Command, interaction: &dyn Interaction) -> Result<()> {
        match command {
            Command::Status => self.post_status(interaction).await,
            Command::Logs => self.post_logs(interaction).await,
            Command::Restart => self.restart_server(interaction).await,
        }
    }

    async fn post_status(&self, interaction: &dyn Interaction) -> Result<()> {
        interaction
            .respond(Reply::text("Getting server status..."))
            .await?;

        let reply = match self.controller.get_status(interaction.channel_id()).await {
            Some(report) => render_status(&report),
            None => Reply::text(NO_SERVER_MESSAGE),
        };

        interaction.edit_response(reply).await
    }

    async fn post_logs(&self, interaction: &dyn Interaction) -> Result<()> {
        interaction
            .respond(Reply::text("Getting server logs..."))
            .await?;

        let reply = match self.controller.get_logs(interaction.channel_id()).await {
            Some(report) => render_logs(&report),
            None => Reply::text(NO_SERVER_MESSAGE),
        };

        interaction.edit_response(reply).await
    }

    async fn restart_server(&self, interaction: &dyn Interaction) -> Result<()> {
        interaction
            .respond(Reply::text("Getting server status..."))
            .await?;

        let progress = EditProgress { interaction };
        let message = match self
            .controller
            .restart(interaction.channel_id(), &progress)
            .await
        {
            Some(outcome) => outcome.message(),
            None => NO_SERVER_MESSAGE,
        };

        interaction.edit_response(Reply::text(message)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::LogBundle;

    #[test]
    fn test_command_display_round_trips() {
        for command in Command::all() {
            assert_eq!(command.to_string().parse::<Command>().unwrap(), command);
        }
    }

    #[test]
    fn test_foreign_group_is_rejected() {
        assert!("admin status".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn test_definitions_describe_server_group() {
        let definitions = command_definitions();
        assert_eq!(definitions.len(), 1);

        let group = &definitions[0];
        assert_eq!(group.name, "server");
        let names: Vec<_> = group.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["status", "logs", "restart"]);

        let json = serde_json::to_value(&definitions).unwrap();
        assert_eq!(json[0]["type"], 1);
        assert!(json[0]["options"][0].get("options").is_none());
    }

    #[test]
    fn test_render_status_panel() {
        let reply = render_status(&StatusReport {
            name: "Valheim".to_string(),
            online: false,
        });

        let panel = reply.panel.unwrap();
        assert_eq!(panel.author, "Valheim");
        assert_eq!(panel.status, "Offline");
        assert_eq!(panel.footer, "Skipper");
        assert!(reply.content.is_none());
    }

    #[test]
    fn test_render_empty_logs() {
        let reply = render_logs(&LogsReport {
            name: "Valheim".to_string(),
            logs: LogBundle::new(Some(String::new()), Some("   ".to_string())),
        });

        assert_eq!(reply.content.as_deref(), Some(NO_LOGS_MESSAGE));
        assert!(reply.attachments.is_empty());
    }

    #[test]
    fn test_render_stderr_only() {
        let reply = render_logs(&LogsReport {
            name: "Valheim".to_string(),
            logs: LogBundle::new(None, Some("crashed".to_string())),
        });

        assert_eq!(reply.attachments, vec![Attachment::new("stderr.txt", "crashed")]);
    }
}
