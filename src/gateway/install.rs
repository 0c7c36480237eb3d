//! Registration of the command group with the chat platform.

use crate::config::{Config, GuildId, Snowflake};
use crate::error::{Error, Result};
use crate::gateway::commands::{CommandDefinition, command_definitions};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct Application {
    id: Snowflake,
}

/// Installs the command definitions against the configured guild.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    client: Client,
    api_base_url: String,
    token: String,
    guild_id: GuildId,
}

impl CommandInstaller {
    /// Create an installer from the loaded configuration
    pub fn new(config: &Config) -> Result<Self> {
        Self::from_parts(config.api_base_url(), &config.discord_token, config.guild_id)
    }

    /// Create an installer for an explicit API base URL, bot token and guild
    pub fn from_parts(api_base_url: &str, token: &str, guild_id: GuildId) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Gateway(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            guild_id,
        })
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// URL that resolves the bot's own application
    pub fn application_url(&self) -> String {
        format!("{}/oauth2/applications/@me", self.api_base_url)
    }

    /// URL of the guild command collection for `application_id`
    pub fn guild_commands_url(&self, application_id: Snowflake) -> String {
        format!(
            "{}/applications/{}/guilds/{}/commands",
            self.api_base_url, application_id, self.guild_id
        )
    }

    /// Look up the application the bot token belongs to
    pub async fn application_id(&self) -> Result<Snowflake> {
        let url = self.application_url();
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization())
            .send()
            .await
            .map_err(|e| Error::Gateway(format!("Request to {} failed: {}", url, e)))?;

        let application: Application = Self::handle_response(&url, response).await?;
        Ok(application.id)
    }

    /// Replace the guild's commands with the `server` command group.
    ///
    /// Returns the number of top-level commands the platform accepted.
    #[tracing::instrument(skip(self), fields(guild_id = %self.guild_id))]
    pub async fn install(&self) -> Result<usize> {
        let application_id = self.application_id().await?;
        let url = self.guild_commands_url(application_id);
        let definitions = command_definitions();

        tracing::info!(
            application_id = %application_id,
            commands = definitions.len(),
            "Registering guild commands"
        );

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.authorization())
            .json(&definitions)
            .send()
            .await
            .map_err(|e| Error::Gateway(format!("Request to {} failed: {}", url, e)))?;

        let registered: Vec<CommandDefinition> = Self::handle_response(&url, response).await?;
        tracing::info!(registered = registered.len(), "Guild commands registered");
        Ok(registered.len())
    }

    async fn handle_response<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| {
                Error::Serialization(format!("Failed to parse response from {}: {}", url, e))
            });
        }

        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 401 {
            return Err(Error::Unauthorized(format!("{} rejected the bot token", url)));
        }
        Err(Error::Gateway(format!(
            "{} returned {}: {}",
            url, status, body
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_use_trimmed_base() {
        let installer =
            CommandInstaller::from_parts("https://chat.example.com/api/v10/", "t", Snowflake::new(5))
                .unwrap();

        assert_eq!(
            installer.application_url(),
            "https://chat.example.com/api/v10/oauth2/applications/@me"
        );
        assert_eq!(
            installer.guild_commands_url(Snowflake::new(7)),
            "https://chat.example.com/api/v10/applications/7/guilds/5/commands"
        );
        assert_eq!(installer.authorization(), "Bot t");
    }

    #[test]
    fn test_application_id_accepts_string_ids() {
        let application: Application =
            serde_json::from_str(r#"{"id": "1244251924262551573", "name": "bot"}"#).unwrap();
        assert_eq!(application.id.get(), 1244251924262551573);
    }
}
