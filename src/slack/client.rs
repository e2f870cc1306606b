use crate::config::SlackConfig;
use crate::error::{ModLoggerError, Result};
use crate::metadata::{ChannelInfo, MetadataSource, UserInfo};
use async_trait::async_trait;
use slack_morphism::prelude::*;
use std::sync::Arc;
use std::time::Instant;

pub struct SlackClient {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
    app_token: SlackApiToken,
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| ModLoggerError::SlackApi(e.to_string()))?;

        let client = Arc::new(slack_morphism::SlackClient::new(connector));
        let token = SlackApiToken::new(config.bot_token.clone().into());
        let app_token = SlackApiToken::new(config.app_token.clone().into());

        Ok(Self {
            client,
            token,
            app_token,
        })
    }

    pub fn get_client(&self) -> Arc<SlackHyperClient> {
        self.client.clone()
    }

    /// Token used to open Socket Mode connections
    pub fn get_app_token(&self) -> &SlackApiToken {
        &self.app_token
    }

    /// Get channel information from Slack API
    pub async fn get_channel_info(&self, channel_id: &str) -> Result<ChannelInfo> {
        let session = self.client.open_session(&self.token);

        let request =
            SlackApiConversationsInfoRequest::new(SlackChannelId(channel_id.to_string()));

        let response = session
            .conversations_info(&request)
            .await
            .map_err(|e| ModLoggerError::SlackApi(e.to_string()))?;

        let channel = response.channel;

        Ok(ChannelInfo {
            id: channel.id.to_string(),
            name: channel.name.unwrap_or_default(),
            fetched_at: Instant::now(),
        })
    }

    /// Get user information from Slack API
    pub async fn get_user_info(&self, user_id: &str) -> Result<UserInfo> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));

        let response = session
            .users_info(&request)
            .await
            .map_err(|e| ModLoggerError::SlackApi(e.to_string()))?;

        let user = response.user;

        Ok(UserInfo {
            id: user.id.to_string(),
            name: user.name.unwrap_or_else(|| user_id.to_string()),
            real_name: user.real_name,
            display_name: user.profile.as_ref().and_then(|p| p.display_name.clone()),
            fetched_at: Instant::now(),
        })
    }
}

#[async_trait]
impl MetadataSource for SlackClient {
    async fn fetch_channel_info(&self, channel_id: &str) -> Result<ChannelInfo> {
        self.get_channel_info(channel_id).await
    }

    async fn fetch_user_info(&self, user_id: &str) -> Result<UserInfo> {
        self.get_user_info(user_id).await
    }
}
