//! Socket.IO push channel (Engine.IO v4 over WebSocket)
//!
//! Only what the dashboard needs: open handshake, namespace connect,
//! ping/pong and `new_alert` events. Packet format:
//!
//! - `0{...}` open, `1` close, `2` ping, `3` pong, `4...` message
//! - message `40` connect, `41` disconnect, `42[name, args...]` event,
//!   `44{...}` connect error

use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use tungstenite::{HandshakeError, Message, WebSocket};
use url::Url;

use super::{GatewayError, Result};
use crate::alerts::Alert;

/// Event name carrying one alert record
pub const NEW_ALERT_EVENT: &str = "new_alert";

/// How often the blocking handshake and reader check for cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub type Socket = WebSocket<TcpStream>;

/// One decoded Engine.IO / Socket.IO text frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Open(Value),
    Close,
    Ping,
    Pong,
    Connected,
    Disconnected,
    Event { name: String, args: Vec<Value> },
    ConnectError(String),
    Other(String),
}

/// WebSocket URL of the Socket.IO endpoint under `base`
pub fn socket_url(base: &Url) -> Result<Url> {
    let mut url = base.join("socket.io/")?;
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|_| GatewayError::Handshake(format!("cannot use {} for {}", scheme, base)))?;
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

/// Decode one text frame
pub fn parse_frame(text: &str) -> Result<Frame> {
    let mut chars = text.chars();
    let frame = match chars.next() {
        Some('0') => Frame::Open(serde_json::from_str(chars.as_str())?),
        Some('1') => Frame::Close,
        Some('2') => Frame::Ping,
        Some('3') => Frame::Pong,
        Some('4') => parse_message(chars.as_str())?,
        _ => Frame::Other(text.to_string()),
    };
    Ok(frame)
}

fn parse_message(body: &str) -> Result<Frame> {
    let mut chars = body.chars();
    let frame = match chars.next() {
        Some('0') => Frame::Connected,
        Some('1') => Frame::Disconnected,
        Some('2') => {
            let args: Vec<Value> = serde_json::from_str(strip_namespace_and_ack(chars.as_str()))?;
            let mut args = args.into_iter();
            match args.next() {
                Some(Value::String(name)) => Frame::Event {
                    name,
                    args: args.collect(),
                },
                _ => return Err(GatewayError::Handshake("event without a name".to_string())),
            }
        }
        Some('4') => Frame::ConnectError(chars.as_str().to_string()),
        _ => Frame::Other(format!("4{}", body)),
    };
    Ok(frame)
}

/// Skip an optional `/namespace,` prefix and an optional numeric ack id
fn strip_namespace_and_ack(payload: &str) -> &str {
    let payload = if payload.starts_with('/') {
        payload.split_once(',').map(|(_, rest)| rest).unwrap_or("")
    } else {
        payload
    };
    payload.trim_start_matches(|c: char| c.is_ascii_digit())
}

/// Decode the alert carried by a `new_alert` event
pub fn alert_from_args(args: Vec<Value>) -> Result<Alert> {
    let payload = args
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Handshake(format!("{} without payload", NEW_ALERT_EVENT)))?;
    Ok(serde_json::from_value(payload)?)
}

fn is_poll_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

fn cancelled() -> GatewayError {
    GatewayError::Handshake("cancelled".to_string())
}

/// Connect and complete the WebSocket, Engine.IO and namespace handshakes.
///
/// Reads poll `cancel` every `POLL_INTERVAL`, so a peer that accepts the TCP
/// connection and then stalls never pins the calling thread.
pub fn connect(url: &Url, cancel: &CancellationToken) -> Result<Socket> {
    if url.scheme() != "ws" {
        return Err(GatewayError::Handshake(format!("unsupported push scheme {}", url.scheme())));
    }
    let addrs = url.socket_addrs(|| None).map_err(tungstenite::Error::Io)?;
    let stream = TcpStream::connect(&*addrs).map_err(tungstenite::Error::Io)?;
    stream.set_read_timeout(Some(POLL_INTERVAL)).map_err(tungstenite::Error::Io)?;

    let mut upgrade = tungstenite::client(url.as_str(), stream);
    let mut ws = loop {
        match upgrade {
            Ok((ws, _response)) => break ws,
            Err(HandshakeError::Interrupted(mid)) => {
                if cancel.is_cancelled() {
                    return Err(cancelled());
                }
                upgrade = mid.handshake();
            }
            Err(HandshakeError::Failure(e)) => return Err(e.into()),
        }
    };

    loop {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }
        let text = match ws.read() {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => return Err(GatewayError::Handshake("closed during handshake".to_string())),
            Ok(_) => continue,
            Err(tungstenite::Error::Io(e)) if is_poll_timeout(&e) => continue,
            Err(e) => return Err(e.into()),
        };
        match parse_frame(text.as_str())? {
            Frame::Open(info) => {
                trace!("Socket: open {}", info);
                ws.send(Message::text("40"))?;
            }
            Frame::Ping => ws.send(Message::text("3"))?,
            Frame::Connected => break,
            Frame::ConnectError(reason) => return Err(GatewayError::Handshake(reason)),
            other => trace!("Socket: ignoring {:?} during handshake", other),
        }
    }

    Ok(ws)
}

/// Forward `new_alert` events to `events` until cancelled, closed, or the receiver is gone.
/// `cancel` is cancelled on exit so the subscription reads as closed.
pub fn read_loop(mut ws: Socket, events: mpsc::UnboundedSender<Alert>, cancel: CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            debug!("Socket: subscription closed");
            let _ = ws.close(None);
            break;
        }

        let text = match ws.read() {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                info!("Socket: server closed the push channel");
                break;
            }
            Ok(_) => continue,
            Err(tungstenite::Error::Io(e)) if is_poll_timeout(&e) => continue,
            Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => break,
            Err(e) => {
                warn!("Socket: read failed: {}", e);
                break;
            }
        };

        match parse_frame(text.as_str()) {
            Ok(Frame::Ping) => {
                if let Err(e) = ws.send(Message::text("3")) {
                    warn!("Socket: pong failed: {}", e);
                    break;
                }
            }
            Ok(Frame::Event { name, args }) if name == NEW_ALERT_EVENT => match alert_from_args(args) {
                Ok(alert) => {
                    trace!("Socket: new alert {}", alert.id);
                    if events.send(alert).is_err() {
                        debug!("Socket: event receiver dropped");
                        break;
                    }
                }
                Err(e) => warn!("Socket: dropping malformed alert: {}", e),
            },
            Ok(Frame::Event { name, .. }) => trace!("Socket: ignoring event {}", name),
            Ok(Frame::Close) | Ok(Frame::Disconnected) => {
                info!("Socket: disconnected by server");
                break;
            }
            Ok(_) => {}
            Err(e) => warn!("Socket: bad frame {:?}: {}", text.as_str(), e),
        }
    }
    cancel.cancel();
}
