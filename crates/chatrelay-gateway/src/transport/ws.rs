//! WebSocket handler.
//!
//! Responsibilities:
//! - Origin guard, then upgrade HTTP -> WS
//! - Transport connect: register the connection with the relay, send welcome
//! - Session loop: outbound queue writer + inbound reader in one `select!`
//! - Transport disconnect: drive `RelayEvent::Disconnect` exactly once

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::Instrument;

use chatrelay_core::error::RelayError;
use chatrelay_core::protocol::DirectFrame;

use crate::app_state::AppState;
use crate::realtime::{ConnId, Connection, PreparedMsg, Relay, RelayEvent};
use crate::transport::codec::{decode, Inbound};

// Frames between max_frame_bytes and this get an error frame; beyond it the
// transport drops the connection.
const TRANSPORT_LIMIT_FACTOR: usize = 4;

pub async fn ws_upgrade(
    State(app): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    if let Err(e) = app.origin_guard().check(origin) {
        tracing::warn!(origin = ?origin, error = %e, "upgrade rejected");
        return (StatusCode::FORBIDDEN, e.to_string()).into_response();
    }

    let limit = app.cfg().gateway.max_frame_bytes.saturating_mul(TRANSPORT_LIMIT_FACTOR);
    ws.max_message_size(limit)
        .on_upgrade(move |socket| run_session(app, socket))
}

async fn run_session(app: AppState, socket: WebSocket) {
    let relay = app.relay();
    let (out_tx, out_rx) = mpsc::channel::<PreparedMsg>(app.cfg().gateway.outbound_queue);
    let conn_id = match relay.accept(Connection::new(out_tx)).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "connection not accepted");
            return;
        }
    };

    let span = tracing::info_span!("session", conn_id);
    async move {
        session_loop(&app, &relay, conn_id, socket, out_rx).await;

        if let Err(e) = relay.handle_event(conn_id, RelayEvent::Disconnect).await {
            tracing::warn!(error = %e, "disconnect handling failed");
        }
        tracing::debug!(active = relay.connections().len(), "session closed");
    }
    .instrument(span)
    .await
}

async fn session_loop(
    app: &AppState,
    relay: &Relay,
    conn_id: ConnId,
    socket: WebSocket,
    mut out_rx: mpsc::Receiver<PreparedMsg>,
) {
    let max_frame_bytes = app.cfg().gateway.max_frame_bytes;
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                let Some(m) = maybe_out else { break; };
                if ws_tx.send(Message::Text(m.as_str().to_owned())).await.is_err() {
                    break;
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let msg = match incoming {
                    Ok(msg) => msg,
                    Err(e) => {
                        tracing::debug!(error = %e, "transport read failed");
                        break;
                    }
                };

                let frame = match decode(msg, max_frame_bytes) {
                    Ok(Inbound::Frame(frame)) => frame,
                    Ok(Inbound::Ping | Inbound::Pong) => continue,
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "frame rejected");
                        reply_error(relay, conn_id, &e).await;
                        continue;
                    }
                };

                if let Err(e) = relay.handle_event(conn_id, frame.into()).await {
                    tracing::warn!(error = %e, "event handling failed");
                    reply_error(relay, conn_id, &e).await;
                }
            }
        }
    }
}

async fn reply_error(relay: &Relay, conn_id: ConnId, err: &RelayError) {
    if let Err(e) = relay.send_direct(conn_id, &DirectFrame::from_error(err)).await {
        tracing::debug!(error = %e, "error frame not sent");
    }
}
