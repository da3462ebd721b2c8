//! Outbound delivery: push messages and mail
//!
//! Both clients are optional. When their endpoint is not configured a send
//! is skipped and reported as not delivered.

use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Settings;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

fn build_client() -> Result<Client, NotifyError> {
    Ok(Client::builder().timeout(Duration::from_secs(10)).build()?)
}

async fn ensure_success(response: reqwest::Response) -> Result<(), NotifyError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(NotifyError::Rejected {
        status: response.status().as_u16(),
        body: response.text().await.unwrap_or_default(),
    })
}

/// Where a push message goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTarget {
    Topic(String),
    Device(String),
}

impl PushTarget {
    fn address(&self) -> String {
        match self {
            PushTarget::Topic(topic) => format!("/topics/{}", topic),
            PushTarget::Device(token) => token.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PushMessage<'a> {
    to: String,
    notification: PushBody<'a>,
}

#[derive(Debug, Serialize)]
struct PushBody<'a> {
    title: &'a str,
    body: &'a str,
}

/// Messaging provider client
#[derive(Clone)]
pub struct PushClient {
    client: Client,
    endpoint: Option<String>,
    server_key: Option<String>,
}

impl PushClient {
    pub fn new(settings: &Settings) -> Result<Self, NotifyError> {
        Ok(Self {
            client: build_client()?,
            endpoint: settings.push_endpoint.clone(),
            server_key: settings.push_server_key.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Send one message; `Ok(false)` when push is not configured
    pub async fn send(
        &self,
        target: &PushTarget,
        title: &str,
        body: &str,
    ) -> Result<bool, NotifyError> {
        let Some(endpoint) = &self.endpoint else {
            info!("Push not configured, skipping message to {:?}", target);
            return Ok(false);
        };

        let message = PushMessage {
            to: target.address(),
            notification: PushBody { title, body },
        };

        let mut request = self.client.post(endpoint).json(&message);
        if let Some(key) = &self.server_key {
            request = request.header(reqwest::header::AUTHORIZATION, format!("key={}", key));
        }

        ensure_success(request.send().await?).await?;
        info!("Push message delivered to {:?}", target);
        Ok(true)
    }

    /// Send and fold any failure into "not delivered"
    pub async fn deliver(&self, target: &PushTarget, title: &str, body: &str) -> bool {
        match self.send(target, title, body).await {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!("Push delivery failed: {}", e);
                false
            }
        }
    }
}

/// HTTP mail relay client
#[derive(Clone)]
pub struct Mailer {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(settings: &Settings) -> Result<Self, NotifyError> {
        Ok(Self {
            client: build_client()?,
            endpoint: settings.mail_endpoint.clone(),
            api_key: settings.mail_api_key.clone(),
            from: settings.mail_from.clone(),
        })
    }

    /// Send one mail; `Ok(false)` when mail is not configured
    pub async fn send(&self, to: &str, subject: &str, text: &str) -> Result<bool, NotifyError> {
        let Some(endpoint) = &self.endpoint else {
            info!("Mail not configured, skipping message to {}", to);
            return Ok(false);
        };

        let mut request = self.client.post(endpoint).json(&json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "text": text,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        ensure_success(request.send().await?).await?;
        info!("Mail delivered to {}", to);
        Ok(true)
    }

    pub async fn deliver(&self, to: &str, subject: &str, text: &str) -> bool {
        match self.send(to, subject, text).await {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!("Mail delivery failed: {}", e);
                false
            }
        }
    }
}
