//! Fight stream subscriber.

use futures_util::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use uuid::Uuid;

use super::ClientError;
use crate::objects::ws::FightStreamMessage;

/// Stream of decoded frames from a fight WebSocket. Ends when the server
/// closes the connection.
pub type FightStream =
    std::pin::Pin<Box<dyn Stream<Item = Result<FightStreamMessage, ClientError>> + Send>>;

/// Connect to `GET /api/v1/public/fights/{fight_id}/ws`.
///
/// `base_url` is the HTTP root of the server; the scheme is switched to
/// `ws`/`wss` automatically.
pub async fn subscribe_fight(base_url: &Url, fight_id: Uuid) -> Result<FightStream, ClientError> {
    let mut url = base_url.join(&format!("/api/v1/public/fights/{fight_id}/ws"))?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    // http(s) -> ws(s) is always accepted by `Url::set_scheme`.
    let _ = url.set_scheme(scheme);

    let (socket, _) = tokio_tungstenite::connect_async(url.as_str()).await?;

    let stream = socket.filter_map(|frame| async move {
        match frame {
            Ok(Message::Text(text)) => Some(
                serde_json::from_str::<FightStreamMessage>(text.as_str()).map_err(ClientError::from),
            ),
            Ok(Message::Close(_)) => None,
            Ok(_) => None,
            Err(e) => Some(Err(ClientError::from(e))),
        }
    });

    Ok(Box::pin(stream))
}
