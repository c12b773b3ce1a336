use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use kanau::processor::Processor;
use pitbet_core::entities::fights::{Fight, GetFightById};
use pitbet_core::framework::DatabaseProcessor;
use pitbet_sdk::objects::ws::{FightStreamMessage, WsCloseCode};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::api::convert::{fight_response, fight_update};
use crate::state::AppState;

/// `GET /fights/{fight_id}/ws`: WebSocket fight stream.
///
/// The first frame is a snapshot of the fight, followed by one update frame
/// per change. The connection is closed after the fight is settled or
/// cancelled.
pub(super) async fn fight_stream(
    state: State<AppState>,
    Path(fight_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let app_state = state.0.clone();
    ws.on_upgrade(move |socket| handle_fight_ws(socket, app_state, fight_id))
}

enum Snapshot {
    Sent { terminal: bool },
    /// Client gone or fight unreadable; stop streaming.
    Stop,
}

async fn handle_fight_ws(mut socket: WebSocket, state: AppState, fight_id: Uuid) {
    let processor = state.processor();

    // Subscribe before reading the snapshot so nothing committed in between
    // is missed.
    let mut events = state.bets.bus().subscribe();

    match send_snapshot(&mut socket, &processor, fight_id).await {
        Snapshot::Sent { terminal: false } => {}
        Snapshot::Sent { terminal: true } => {
            close(&mut socket, WsCloseCode::NORMAL, "fight finished").await;
            return;
        }
        Snapshot::Stop => return,
    }

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) if event.fight_id() == Some(fight_id) => {
                    let Some(update) = fight_update(&event) else {
                        continue;
                    };
                    if send_json(&mut socket, &FightStreamMessage::Update { update })
                        .await
                        .is_err()
                    {
                        return;
                    }
                    if event.ends_fight() {
                        match send_snapshot(&mut socket, &processor, fight_id).await {
                            Snapshot::Sent { .. } => {
                                close(&mut socket, WsCloseCode::NORMAL, "fight finished").await;
                            }
                            Snapshot::Stop => {}
                        }
                        return;
                    }
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%fight_id, skipped, "WS: event receiver lagged, resending snapshot");
                    match send_snapshot(&mut socket, &processor, fight_id).await {
                        Snapshot::Sent { terminal: false } => {}
                        Snapshot::Sent { terminal: true } => {
                            close(&mut socket, WsCloseCode::NORMAL, "fight finished").await;
                            return;
                        }
                        Snapshot::Stop => return,
                    }
                }
                Err(RecvError::Closed) => break,
            },

            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => {}
            },
        }
    }

    close(&mut socket, WsCloseCode::NORMAL, "server shutting down").await;
}

/// Read the fight and send it. Sends an error frame and closes the socket
/// when the fight is missing or the query fails.
async fn send_snapshot(
    socket: &mut WebSocket,
    processor: &DatabaseProcessor,
    fight_id: Uuid,
) -> Snapshot {
    let fight: Fight = match processor.process(GetFightById { fight_id }).await {
        Ok(Some(fight)) => fight,
        Ok(None) => {
            send_error(socket, WsCloseCode::FIGHT_NOT_FOUND, "fight not found").await;
            return Snapshot::Stop;
        }
        Err(e) => {
            tracing::error!(error = %e, %fight_id, "WS: failed to query fight");
            send_error(socket, WsCloseCode::INTERNAL_ERROR, "internal error").await;
            return Snapshot::Stop;
        }
    };

    let msg = FightStreamMessage::Snapshot {
        fight: fight_response(&fight),
    };
    if send_json(socket, &msg).await.is_err() {
        return Snapshot::Stop;
    }
    Snapshot::Sent {
        terminal: fight.status.is_terminal(),
    }
}

async fn send_error(socket: &mut WebSocket, code: u16, reason: &str) {
    let _ = send_json(
        socket,
        &FightStreamMessage::Error {
            code,
            reason: reason.to_owned(),
        },
    )
    .await;
    close(socket, code, reason).await;
}

async fn close(socket: &mut WebSocket, code: u16, reason: &str) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.to_owned().into(),
        })))
        .await;
}

/// Serialize `value` as JSON and send it as a text frame.
///
/// Returns `Err(())` if the client is gone.
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
