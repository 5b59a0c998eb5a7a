//! Push-connection client for native consumers of the feed.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `tokio-tungstenite`.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::objects::FeedFrame;

/// Errors produced by [`FeedSubscriber`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Handshake or transport failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A text frame was not a valid [`FeedFrame`].
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives paced frames from a relay's `GET /ws` endpoint.
pub struct FeedSubscriber {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl FeedSubscriber {
    /// Connect to a push endpoint such as `ws://127.0.0.1:3000/ws`.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (stream, _response) = connect_async(url).await?;
        Ok(Self { stream })
    }

    /// Wait for the next frame.
    ///
    /// Returns `None` once the server closes the connection. A malformed
    /// text frame yields `Some(Err(ClientError::Json))`; the connection
    /// stays usable and the caller may simply drop the error.
    pub async fn next_frame(&mut self) -> Option<Result<FeedFrame, ClientError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(text.as_str()).map_err(ClientError::from));
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    /// Send a close frame and wait for the server to acknowledge it.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
