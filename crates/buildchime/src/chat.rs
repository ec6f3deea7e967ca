use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::NotificationError;

/// Per-request wall clock bound. The run either delivers promptly or fails;
/// there is no retry loop to absorb a hung connection.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const LOGIN_PATH: &str = "/api/v1/login";
const POST_MESSAGE_PATH: &str = "/api/v1/chat.postMessage";

/// Rich-content block inside a chat message.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub text: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Message body posted to the chat service. `None` fields are omitted from
/// the JSON so the server applies its own defaults.
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    auth_token: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    status: String,
    data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "authToken")]
    auth_token: String,
}

/// Minimal Rocket.Chat-compatible client: one optional login, one message
/// post. With a session (logged in or pre-issued) it talks to the REST API;
/// without one it treats the configured URL as an incoming webhook.
pub struct ChatClient {
    base_url: String,
    http: reqwest::Client,
    session: Option<Session>,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            session: None,
        }
    }

    /// Attach pre-issued REST credentials without a login round trip.
    pub fn with_session(base_url: &str, user_id: &str, auth_token: &str) -> Self {
        let mut client = Self::new(base_url);
        client.session = Some(Session {
            user_id: user_id.to_string(),
            auth_token: auth_token.to_string(),
        });
        client
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Exchange (username, password) for a session token. Any failure here
    /// is authentication, including transport errors on the login call.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), NotificationError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let body = serde_json::json!({ "user": username, "password": password });

        debug!(%url, user = username, "logging in");

        let resp = self
            .http
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::Authentication(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, body = %body, "login rejected");
            return Err(NotificationError::Authentication(format!(
                "login returned {status}: {body}"
            )));
        }

        let login: LoginResponse = resp
            .json()
            .await
            .map_err(|e| NotificationError::Authentication(e.to_string()))?;

        match (login.status.as_str(), login.data) {
            ("success", Some(data)) => {
                self.session = Some(Session {
                    user_id: data.user_id,
                    auth_token: data.auth_token,
                });
                Ok(())
            }
            (status, _) => Err(NotificationError::Authentication(format!(
                "login status '{status}'"
            ))),
        }
    }

    /// Deliver the payload. Exactly one POST; transport errors and non-2xx
    /// responses propagate as delivery failures.
    pub async fn post_message(&self, payload: &Payload) -> Result<(), NotificationError> {
        let url = match &self.session {
            Some(_) => format!("{}{}", self.base_url, POST_MESSAGE_PATH),
            None => self.base_url.clone(),
        };

        debug!(%url, "posting message");

        let mut req = self.http.post(&url).timeout(REQUEST_TIMEOUT);
        if let Some(session) = &self.session {
            req = req
                .header("X-Auth-Token", &session.auth_token)
                .header("X-User-Id", &session.user_id);
        }

        let resp = req
            .json(payload)
            .send()
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        if resp.status().is_success() {
            debug!("message delivered");
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, body = %body, "message rejected");
            Err(NotificationError::Delivery(format!(
                "post returned {status}: {body}"
            )))
        }
    }
}
