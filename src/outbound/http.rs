//! HTTP message sender for the messaging platform's bot API.

use async_trait::async_trait;
use serde::Deserialize;

use super::{CallbackAnswer, DeliveryId, MessageSender, OutboundMessage, SendError};
use crate::error::BotError;
use crate::Result;

#[derive(Deserialize)]
struct SendResponse {
    #[serde(default)]
    message_id: String,
}

/// Sender that posts messages and callback answers to the platform's HTTP
/// API, authenticating with the bot token.
pub struct HttpMessageSender {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl HttpMessageSender {
    /// Create a sender for the given API base URL and bot token.
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        let token = token.into();
        if api_base.is_empty() {
            return Err(BotError::Config("bot api base url is empty".into()));
        }
        if token.is_empty() {
            return Err(BotError::Config("bot token is empty".into()));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| BotError::Send(e.to_string()))?;

        Ok(Self {
            client,
            api_base,
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}?access_token={}", self.api_base, path, self.token)
    }

    async fn check(response: reqwest::Response) -> std::result::Result<reqwest::Response, SendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SendError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl MessageSender for HttpMessageSender {
    async fn send(&self, message: OutboundMessage) -> std::result::Result<DeliveryId, SendError> {
        let response = self
            .client
            .post(self.url("/messages"))
            .json(&message)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let response = Self::check(response).await?;
        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;
        Ok(parsed.message_id)
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        answer: CallbackAnswer,
    ) -> std::result::Result<(), SendError> {
        let response = self
            .client
            .post(self.url(&format!("/answers/{callback_id}")))
            .json(&answer)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        Self::check(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_base_url_and_token() {
        assert!(HttpMessageSender::new("", "token").is_err());
        assert!(HttpMessageSender::new("https://api.example", "").is_err());
        assert!(HttpMessageSender::new("https://api.example/", "token").is_ok());
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let sender = HttpMessageSender::new("https://api.example/", "t").unwrap();
        assert_eq!(
            sender.url("/messages"),
            "https://api.example/messages?access_token=t"
        );
    }
}
