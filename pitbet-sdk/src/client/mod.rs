//! Clients for a pitbet server: [`ServiceClient`] for the player backend,
//! [`AdminClient`] for operator tooling and [`subscribe_fight`] for the live
//! fight stream.

mod admin;
mod service;
mod stream;

pub use admin::AdminClient;
pub use service::ServiceClient;
pub use stream::{FightStream, subscribe_fight};

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Wrong service secret, stale signature or wrong admin secret.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server understood the request and refused it. `message` is the
    /// plain-text reason, e.g. `"fight ... is not open for betting"`.
    #[error("rejected with {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl ClientError {
    /// HTTP status of a refused request.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }

    /// The bet, fight or proposal changed state first (`409`).
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        let bytes = resp.bytes().await?;
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let message = resp.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        Err(ClientError::Unauthorized(message))
    } else {
        Err(ClientError::Rejected { status, message })
    }
}
