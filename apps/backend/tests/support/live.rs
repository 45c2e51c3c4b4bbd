//! Real server plus a tungstenite client for live-socket tests.

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uncolympics::state::app_state::AppState;
use uncolympics::{routes, RequestTrace, TraceSpan};

pub async fn start_test_server(
    state: AppState,
) -> Result<(ServerHandle, SocketAddr), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((handle, addr))
}

pub struct LiveClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl LiveClient {
    pub async fn connect(
        addr: SocketAddr,
        session_id: &str,
        device: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let url = format!("ws://{addr}/api/sessions/{session_id}/live?device={device}");
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    pub async fn send_json(&mut self, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
        self.stream
            .send(Message::Text(value.to_string().into()))
            .await?;
        Ok(())
    }

    /// Next JSON text frame; pings and pongs are skipped. `None` once the
    /// server closed the socket.
    pub async fn next_json(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Value>, Box<dyn std::error::Error>> {
        loop {
            let frame = tokio::time::timeout(timeout, self.stream.next())
                .await
                .map_err(|_| "timed out waiting for a frame")?;
            match frame {
                Some(Ok(Message::Text(text))) => return Ok(Some(serde_json::from_str(&text)?)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// Skip messages until one of type `kind` arrives.
    pub async fn expect_type(
        &mut self,
        kind: &str,
        timeout: Duration,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        loop {
            match self.next_json(timeout).await? {
                Some(msg) if msg["type"] == kind => return Ok(msg),
                Some(_) => continue,
                None => return Err(format!("socket closed before '{kind}'").into()),
            }
        }
    }
}
